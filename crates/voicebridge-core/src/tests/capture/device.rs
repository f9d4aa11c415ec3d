use crate::capture::device::{encode_wav, peak_level};

/// WHAT: A zero-length capture still encodes to a valid, tiny WAV
/// WHY: The session manager's size gate handles empty captures; the
///      encoder must not fail on them
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_samples_when_encoding_then_header_only_wav() {
    // Given: An empty capture
    let samples: Vec<f32> = Vec::new();

    // When: Encoding it
    let blob = encode_wav(&samples, 48_000, 1).unwrap();

    // Then: A header-only container, well under any upload threshold
    let bytes = blob.into_bytes();
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");
    assert!(bytes.len() < 100);
}

/// WHAT: Encoded size matches 16-bit PCM expectations
/// WHY: The upload threshold reasons in bytes of encoded audio
#[test]
#[allow(clippy::unwrap_used)]
fn given_one_second_of_mono_audio_when_encoding_then_expected_size() {
    // Given: One second of 16kHz mono silence
    let samples = vec![0.0f32; 16_000];

    // When: Encoding it
    let blob = encode_wav(&samples, 16_000, 1).unwrap();

    // Then: 44-byte header plus two bytes per sample
    assert_eq!(blob.size(), 44 + 16_000 * 2);
}

/// WHAT: Sample values outside -1.0..=1.0 are clamped before quantizing
/// WHY: Hot input must clip, not wrap, in the encoded audio
#[test]
#[allow(clippy::unwrap_used)]
fn given_overdriven_samples_when_encoding_then_clamped_to_full_scale() {
    // Given: Samples beyond full scale in both directions
    let samples = vec![2.0f32, -2.0f32];

    // When: Encoding them
    let blob = encode_wav(&samples, 16_000, 1).unwrap();

    // Then: The payload holds exactly i16::MAX and -i16::MAX
    let bytes = blob.into_bytes();
    let payload = &bytes[44..];
    let first = i16::from_le_bytes([payload[0], payload[1]]);
    let second = i16::from_le_bytes([payload[2], payload[3]]);
    assert_eq!(first, i16::MAX);
    assert_eq!(second, -i16::MAX);
}

/// WHAT: Peak level is the largest absolute sample, capped at 1.0
/// WHY: The viewport expects normalized levels
#[test]
fn given_sample_buffers_when_measuring_peak_then_normalized() {
    assert!((peak_level(&[]) - 0.0).abs() < f32::EPSILON);
    assert!((peak_level(&[0.25, -0.5, 0.1]) - 0.5).abs() < f32::EPSILON);
    assert!((peak_level(&[3.0]) - 1.0).abs() < f32::EPSILON);
}
