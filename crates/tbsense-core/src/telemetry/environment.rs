use super::TelemetryBuffer;
use crate::sensors::EnvironmentSample;

/// Write humidity and temperature into bytes `6..10`.
///
/// Only the low 16 bits of each milli-unit value go on the wire; peers that
/// decode the frame see the same truncation the board has always sent.
pub fn encode_environment(sample: &EnvironmentSample, buffer: &mut TelemetryBuffer) {
    buffer.write_environment(
        sample.temperature_milli_celsius as u16,
        sample.humidity_milli_percent as u16,
    );
}
