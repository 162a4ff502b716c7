use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

// url-safe alphabet, no padding in either direction
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

pub(crate) fn encode(input: impl AsRef<[u8]>) -> String {
    URL_SAFE.encode(input)
}

pub(crate) fn decode(input: &str) -> Option<Vec<u8>> {
    URL_SAFE.decode(input).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_padding_or_unsafe_chars() {
        let encoded = encode([0xfb, 0xff, 0xfe, 0x01]);

        assert_eq!(encoded, "-__-AQ");
        assert_eq!(decode(&encoded).unwrap(), vec![0xfb, 0xff, 0xfe, 0x01]);
    }

    #[test]
    fn test_padded_input_rejected() {
        assert!(decode("-__-AQ==").is_none());
        assert!(decode("-__-AQ").is_some());
        assert!(decode("not base64!").is_none());
    }
}
