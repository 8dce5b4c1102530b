//! Static field tables for the binary file header and the trace header
//!
//! Every entry maps a symbolic name to a 1-based byte offset and a width of
//! two or four bytes, following SEG-Y revision 1. Both tables are immutable
//! and built once on first use.
//!
//! A few trace fields keep legacy 2-byte widths where revision 1 defines
//! wider values (the mantissa fields at bytes 205 and 225).

use crate::codec::{decode_i16, decode_i32, encode_i16, encode_i32};
use crate::error::{Result, SegyError};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Width of a header field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldWidth {
    /// 2-byte signed integer, sign-extended on read
    Short,
    /// 4-byte signed integer
    Long,
}

impl FieldWidth {
    /// Width in bytes
    pub const fn bytes(self) -> usize {
        match self {
            Self::Short => 2,
            Self::Long => 4,
        }
    }
}

/// Location of one named integer field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldInfo {
    /// 1-based byte offset within its block
    pub offset: usize,
    /// Field width
    pub width: FieldWidth,
}

impl FieldInfo {
    /// 2-byte field at a 1-based offset
    pub const fn short(offset: usize) -> Self {
        Self {
            offset,
            width: FieldWidth::Short,
        }
    }

    /// 4-byte field at a 1-based offset
    pub const fn long(offset: usize) -> Self {
        Self {
            offset,
            width: FieldWidth::Long,
        }
    }

    /// Zero-based byte range covered by this field
    pub const fn range(&self) -> std::ops::Range<usize> {
        let start = self.offset.saturating_sub(1);
        start..start + self.width.bytes()
    }
}

/// Binary file header fields (400-byte block after the text header)
pub const BINARY_FIELD_TABLE: &[(&str, FieldInfo)] = &[
    ("JobID", FieldInfo::long(1)),
    ("LineNumber", FieldInfo::long(5)),
    ("ReelNumber", FieldInfo::long(9)),
    ("DataTracesPerEnsemble", FieldInfo::short(13)),
    ("AuxTracesPerEnsemble", FieldInfo::short(15)),
    ("SampleInterval", FieldInfo::short(17)),
    ("SampleIntervalOriginal", FieldInfo::short(19)),
    ("SamplesPerTrace", FieldInfo::short(21)),
    ("SamplesPerTraceOriginal", FieldInfo::short(23)),
    ("DataSampleFormat", FieldInfo::short(25)),
    ("EnsembleFold", FieldInfo::short(27)),
    ("SortingCode", FieldInfo::short(29)),
    ("VerticalSumCode", FieldInfo::short(31)),
    ("SweepFrequencyStart", FieldInfo::short(33)),
    ("SweepFrequencyEnd", FieldInfo::short(35)),
    ("SweepLength", FieldInfo::short(37)),
    ("SweepType", FieldInfo::short(39)),
    ("SweepTraceTaperLengthStart", FieldInfo::short(41)),
    ("SweepTraceTaperLengthEnd", FieldInfo::short(43)),
    ("TaperType", FieldInfo::short(45)),
    ("CorrelatedTraces", FieldInfo::short(47)),
    ("BinaryGainRecovered", FieldInfo::short(49)),
    ("AmplitudeRecoveryMethod", FieldInfo::short(51)),
    ("MeasurementSystem", FieldInfo::short(53)),
    ("ImpulseSignalPolarity", FieldInfo::short(55)),
    ("VibratoryPolarityCode", FieldInfo::short(57)),
];

/// Trace header fields (240-byte block at the start of every record)
pub const TRACE_FIELD_TABLE: &[(&str, FieldInfo)] = &[
    ("TRACE_SEQUENCE_LINE", FieldInfo::long(1)),
    ("TRACE_SEQUENCE_FILE", FieldInfo::long(5)),
    ("FieldRecord", FieldInfo::long(9)),
    ("TraceNumber", FieldInfo::long(13)),
    ("EnergySourcePoint", FieldInfo::long(17)),
    ("CDP", FieldInfo::long(21)),
    ("CDP_TRACE", FieldInfo::long(25)),
    ("TraceIdentificationCode", FieldInfo::short(29)),
    ("NSummedTraces", FieldInfo::short(31)),
    ("NStackedTraces", FieldInfo::short(33)),
    ("DataUse", FieldInfo::short(35)),
    ("offset", FieldInfo::long(37)),
    ("ReceiverGroupElevation", FieldInfo::long(41)),
    ("SourceSurfaceElevation", FieldInfo::long(45)),
    ("SourceDepth", FieldInfo::long(49)),
    ("ReceiverDatumElevation", FieldInfo::long(53)),
    ("SourceDatumElevation", FieldInfo::long(57)),
    ("SourceWaterDepth", FieldInfo::long(61)),
    ("GroupWaterDepth", FieldInfo::long(65)),
    ("ElevationScalar", FieldInfo::short(69)),
    ("SourceGroupScalar", FieldInfo::short(71)),
    ("SourceX", FieldInfo::long(73)),
    ("SourceY", FieldInfo::long(77)),
    ("GroupX", FieldInfo::long(81)),
    ("GroupY", FieldInfo::long(85)),
    ("CoordinateUnits", FieldInfo::short(89)),
    ("WeatheringVelocity", FieldInfo::short(91)),
    ("SubWeatheringVelocity", FieldInfo::short(93)),
    ("SourceUpholeTime", FieldInfo::short(95)),
    ("GroupUpholeTime", FieldInfo::short(97)),
    ("SourceStaticCorrection", FieldInfo::short(99)),
    ("GroupStaticCorrection", FieldInfo::short(101)),
    ("TotalStaticApplied", FieldInfo::short(103)),
    ("LagTimeA", FieldInfo::short(105)),
    ("LagTimeB", FieldInfo::short(107)),
    ("DelayRecordingTime", FieldInfo::short(109)),
    ("MuteTimeStart", FieldInfo::short(111)),
    ("MuteTimeEND", FieldInfo::short(113)),
    ("TRACE_SAMPLE_COUNT", FieldInfo::short(115)),
    ("TRACE_SAMPLE_INTERVAL", FieldInfo::short(117)),
    ("GainType", FieldInfo::short(119)),
    ("InstrumentGainConstant", FieldInfo::short(121)),
    ("InstrumentInitialGain", FieldInfo::short(123)),
    ("Correlated", FieldInfo::short(125)),
    ("SweepFrequencyStart", FieldInfo::short(127)),
    ("SweepFrequencyEnd", FieldInfo::short(129)),
    ("SweepLength", FieldInfo::short(131)),
    ("SweepType", FieldInfo::short(133)),
    ("SweepTraceTaperLengthStart", FieldInfo::short(135)),
    ("SweepTraceTaperLengthEnd", FieldInfo::short(137)),
    ("TaperType", FieldInfo::short(139)),
    ("AliasFilterFrequency", FieldInfo::short(141)),
    ("AliasFilterSlope", FieldInfo::short(143)),
    ("NotchFilterFrequency", FieldInfo::short(145)),
    ("NotchFilterSlope", FieldInfo::short(147)),
    ("LowCutFrequency", FieldInfo::short(149)),
    ("HighCutFrequency", FieldInfo::short(151)),
    ("LowCutSlope", FieldInfo::short(153)),
    ("HighCutSlope", FieldInfo::short(155)),
    ("YearDataRecorded", FieldInfo::short(157)),
    ("DayOfYear", FieldInfo::short(159)),
    ("HourOfDay", FieldInfo::short(161)),
    ("MinuteOfHour", FieldInfo::short(163)),
    ("SecondOfMinute", FieldInfo::short(165)),
    ("TimeBaseCode", FieldInfo::short(167)),
    ("TraceWeightingFactor", FieldInfo::short(169)),
    ("GeophoneGroupNumberRoll1", FieldInfo::short(171)),
    ("GeophoneGroupNumberFirstTraceOrigField", FieldInfo::short(173)),
    ("GeophoneGroupNumberLastTraceOrigField", FieldInfo::short(175)),
    ("GapSize", FieldInfo::short(177)),
    ("OverTravel", FieldInfo::short(179)),
    ("CDP_X", FieldInfo::long(181)),
    ("CDP_Y", FieldInfo::long(185)),
    ("INLINE_3D", FieldInfo::long(189)),
    ("CROSSLINE_3D", FieldInfo::long(193)),
    ("ShotPoint", FieldInfo::long(197)),
    ("ShotPointScalar", FieldInfo::short(201)),
    ("TraceValueMeasurementUnit", FieldInfo::short(203)),
    ("TransductionConstantMantissa", FieldInfo::short(205)),
    ("TransductionConstantPower", FieldInfo::short(209)),
    ("TransductionUnit", FieldInfo::short(211)),
    ("TraceIdentifier", FieldInfo::short(213)),
    ("ScalarTraceHeader", FieldInfo::short(215)),
    ("SourceType", FieldInfo::short(217)),
    ("SourceEnergyDirectionVert", FieldInfo::short(219)),
    ("SourceEnergyDirectionXline", FieldInfo::short(221)),
    ("SourceEnergyDirectionIline", FieldInfo::short(223)),
    ("SourceMeasurementMantissa", FieldInfo::short(225)),
    ("SourceMeasurementExponent", FieldInfo::short(229)),
    ("SourceMeasurementUnit", FieldInfo::short(231)),
    ("UnassignedInt1", FieldInfo::short(233)),
    ("UnassignedInt2", FieldInfo::short(237)),
];

static BINARY_FIELDS: LazyLock<HashMap<&'static str, FieldInfo>> =
    LazyLock::new(|| BINARY_FIELD_TABLE.iter().copied().collect());

static TRACE_FIELDS: LazyLock<HashMap<&'static str, FieldInfo>> =
    LazyLock::new(|| TRACE_FIELD_TABLE.iter().copied().collect());

/// Look up a binary file header field by name
pub fn binary_field(name: &str) -> Result<FieldInfo> {
    BINARY_FIELDS
        .get(name)
        .copied()
        .ok_or_else(|| SegyError::UnknownField {
            table: "binary",
            name: name.to_string(),
        })
}

/// Look up a trace header field by name
pub fn trace_field(name: &str) -> Result<FieldInfo> {
    TRACE_FIELDS
        .get(name)
        .copied()
        .ok_or_else(|| SegyError::UnknownField {
            table: "trace",
            name: name.to_string(),
        })
}

/// Read a field from a header block, sign-extending 2-byte values
pub fn read_field(buf: &[u8], field: &FieldInfo) -> Result<i32> {
    let start = checked_range(buf.len(), field)?.start;
    Ok(match field.width {
        FieldWidth::Short => i32::from(decode_i16([buf[start], buf[start + 1]])),
        FieldWidth::Long => decode_i32([
            buf[start],
            buf[start + 1],
            buf[start + 2],
            buf[start + 3],
        ]),
    })
}

/// Write a field into a header block.
///
/// Values written to 2-byte fields are truncated to `i16`.
pub fn write_field(buf: &mut [u8], field: &FieldInfo, value: i32) -> Result<()> {
    let range = checked_range(buf.len(), field)?;
    let target = &mut buf[range];
    match field.width {
        FieldWidth::Short => target.copy_from_slice(&encode_i16(value as i16)),
        FieldWidth::Long => target.copy_from_slice(&encode_i32(value)),
    }
    Ok(())
}

/// Read a named trace header field
pub fn read_trace_field(header: &[u8], name: &str) -> Result<i32> {
    read_field(header, &trace_field(name)?)
}

/// Read a named binary header field
pub fn read_binary_field(block: &[u8], name: &str) -> Result<i32> {
    read_field(block, &binary_field(name)?)
}

fn checked_range(len: usize, field: &FieldInfo) -> Result<std::ops::Range<usize>> {
    let range = field.range();
    if field.offset == 0 || range.end > len {
        return Err(SegyError::BufferTooSmall {
            needed: range.end,
            actual: len,
        });
    }
    Ok(range)
}
