//! Input-file parsing and fixed-point scaling, ported from the reference
//! implementation's `protocol_manager.py::init_protocol_data`. Input files
//! are UTF-8, comma-separated decimal numbers (plain integers or
//! one-decimal-place floats); each party's maximum value is scaled by 10
//! (so one decimal digit of precision survives) and represented in the
//! circuit's declared bit width, two's complement for negatives.

use gc::error::{Error, Result};

/// One parsed entry from an input file, before scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputValue {
    Int(i64),
    Float(f64),
}

impl InputValue {
    fn as_f64(self) -> f64 {
        match self {
            InputValue::Int(v) => v as f64,
            InputValue::Float(v) => v,
        }
    }

    fn is_float(self) -> bool {
        matches!(self, InputValue::Float(_))
    }
}

/// Parse a comma-separated list of decimal numbers. An entry containing a
/// `.` is parsed as a float, otherwise as an integer -- mirroring the
/// reference parser's `'.' in entry` branch.
pub fn parse_inputs(contents: &str) -> Result<Vec<InputValue>> {
    contents
        .trim()
        .split(',')
        .map(|entry| {
            let entry = entry.trim();
            if entry.contains('.') {
                entry
                    .parse::<f64>()
                    .map(InputValue::Float)
                    .map_err(|e| Error::IoParse(format!("invalid float '{entry}': {e}")))
            } else {
                entry
                    .parse::<i64>()
                    .map(InputValue::Int)
                    .map_err(|e| Error::IoParse(format!("invalid integer '{entry}': {e}")))
            }
        })
        .collect()
}

/// A party's local maximum, scaled to the circuit's bit width.
#[derive(Debug, Clone)]
pub struct ScaledInput {
    pub inputs: Vec<InputValue>,
    pub max_value: f64,
    pub is_float: bool,
    pub is_negative: bool,
    /// Unsigned scaled magnitude as actually encoded on the wires (two's
    /// complement representation, not the signed integer value).
    pub scaled_unsigned: u64,
    /// Most-significant-bit-first bit array of length `bits`.
    pub bits: Vec<bool>,
}

/// Scale the maximum of `inputs` by 10 and encode it as a `bits`-wide
/// two's-complement bit array, most significant bit first.
pub fn scale_max_input(inputs: &[InputValue], bits: u32) -> Result<ScaledInput> {
    let max_entry = inputs
        .iter()
        .copied()
        .max_by(|a, b| a.as_f64().total_cmp(&b.as_f64()))
        .ok_or_else(|| Error::IoParse("no valid inputs found in file".to_string()))?;

    let max_value = max_entry.as_f64();
    let is_float = max_entry.is_float();
    let is_negative = max_value < 0.0;

    let scaled = (max_value * 10.0).round() as i64;
    let modulus = 1i64 << bits;
    if scaled >= modulus / 2 || scaled < -(modulus / 2) {
        return Err(Error::Configuration(format!(
            "scaled value {scaled} does not fit in {bits}-bit two's complement"
        )));
    }
    let scaled_unsigned = if scaled < 0 {
        (modulus + scaled) as u64
    } else {
        scaled as u64
    };

    let bit_vec: Vec<bool> = (0..bits)
        .rev()
        .map(|i| (scaled_unsigned >> i) & 1 == 1)
        .collect();

    Ok(ScaledInput {
        inputs: inputs.to_vec(),
        max_value,
        is_float,
        is_negative,
        scaled_unsigned,
        bits: bit_vec,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_integers_and_floats() {
        let parsed = parse_inputs("1, 2, 3").unwrap();
        assert_eq!(parsed, vec![InputValue::Int(1), InputValue::Int(2), InputValue::Int(3)]);

        let parsed = parse_inputs("9.9, 1.0").unwrap();
        assert_eq!(parsed, vec![InputValue::Float(9.9), InputValue::Float(1.0)]);
    }

    #[test]
    fn rejects_unparseable_entries() {
        assert!(parse_inputs("1, abc, 3").is_err());
    }

    #[test]
    fn scales_positive_integer_to_bit_array() {
        let inputs = parse_inputs("6").unwrap();
        let scaled = scale_max_input(&inputs, 16).unwrap();
        assert_eq!(scaled.scaled_unsigned, 60);
        assert!(!scaled.is_negative);
        let value: u64 = scaled.bits.iter().fold(0u64, |acc, &b| (acc << 1) | u64::from(b));
        assert_eq!(value, 60);
    }

    #[test]
    fn scales_negative_float_with_twos_complement() {
        let inputs = parse_inputs("-9.7").unwrap();
        let scaled = scale_max_input(&inputs, 16).unwrap();
        assert!(scaled.is_negative);
        assert!(scaled.is_float);
        // -97 in 16-bit two's complement.
        assert_eq!(scaled.scaled_unsigned, (1u64 << 16) - 97);
    }

    #[test]
    fn picks_the_maximum_of_several_entries() {
        let inputs = parse_inputs("1, 2, 3").unwrap();
        let scaled = scale_max_input(&inputs, 32).unwrap();
        assert_eq!(scaled.max_value, 3.0);
    }

    #[test]
    fn rejects_values_that_overflow_the_declared_width() {
        let inputs = parse_inputs("-32768").unwrap();
        assert!(scale_max_input(&inputs, 16).is_err());
    }
}
