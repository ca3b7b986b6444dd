//! # Tone Synthesis
//!
//! Sine-wave rendering, WAV encoding, and the small frequency helpers the
//! player screens display next to a track.

use bytes::{BufMut, Bytes, BytesMut};
use std::f64::consts::PI;

/// Length of one rendered loop in seconds.
pub const TONE_LOOP_SECONDS: f64 = 0.5;

/// Sample rate of rendered loops.
pub const TONE_SAMPLE_RATE: u32 = 11_025;

/// Peak amplitude of generated samples.
pub const TONE_AMPLITUDE: f32 = 0.25;

/// Size of the RIFF/WAVE header written by [`encode_wav`].
pub const WAV_HEADER_LEN: usize = 44;

/// Lowest frequency considered audible.
pub const MIN_AUDIBLE_HZ: f64 = 20.0;

/// Highest frequency considered audible.
pub const MAX_AUDIBLE_HZ: f64 = 20_000.0;

const A4_HZ: f64 = 440.0;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Renders `duration_secs` of a sine wave at `frequency_hz`.
///
/// Produces `floor(duration_secs * sample_rate)` samples with peak
/// [`TONE_AMPLITUDE`].
pub fn generate_sine_wave(frequency_hz: f64, duration_secs: f64, sample_rate: u32) -> Vec<f32> {
    let count = (duration_secs * sample_rate as f64).floor().max(0.0) as usize;
    let step = 2.0 * PI * frequency_hz / sample_rate as f64;

    (0..count)
        .map(|i| TONE_AMPLITUDE * (step * i as f64).sin() as f32)
        .collect()
}

/// Encodes samples as a mono 16-bit PCM WAV file.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Bytes {
    let data_len = (samples.len() * 2) as u32;
    let mut buf = BytesMut::with_capacity(WAV_HEADER_LEN + samples.len() * 2);

    buf.put_slice(b"RIFF");
    buf.put_u32_le(36 + data_len);
    buf.put_slice(b"WAVE");

    buf.put_slice(b"fmt ");
    buf.put_u32_le(16); // fmt chunk size
    buf.put_u16_le(1); // PCM
    buf.put_u16_le(1); // mono
    buf.put_u32_le(sample_rate);
    buf.put_u32_le(sample_rate * 2); // byte rate
    buf.put_u16_le(2); // block align
    buf.put_u16_le(16); // bits per sample

    buf.put_slice(b"data");
    buf.put_u32_le(data_len);

    for sample in samples {
        buf.put_i16_le((sample.clamp(-1.0, 1.0) * 32767.0) as i16);
    }

    buf.freeze()
}

/// Renders the standard loop buffer for a tone.
pub fn render_tone(frequency_hz: f64) -> Bytes {
    let samples = generate_sine_wave(frequency_hz, TONE_LOOP_SECONDS, TONE_SAMPLE_RATE);
    encode_wav(&samples, TONE_SAMPLE_RATE)
}

/// Nearest equal-tempered note name with octave, e.g. `"A4"` for 440 Hz.
///
/// Returns an empty string for frequencies that are not positive.
pub fn frequency_to_note(frequency_hz: f64) -> String {
    if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
        return String::new();
    }

    let c0 = A4_HZ * 2f64.powf(-4.75);
    let half_steps = (12.0 * (frequency_hz / c0).log2()).round() as i64;
    let octave = half_steps.div_euclid(12);
    let note = NOTE_NAMES[half_steps.rem_euclid(12) as usize];

    format!("{}{}", note, octave)
}

/// Whether the frequency lies in the audible range (20 Hz to 20 kHz).
pub fn is_valid_frequency(frequency_hz: f64) -> bool {
    (MIN_AUDIBLE_HZ..=MAX_AUDIBLE_HZ).contains(&frequency_hz)
}

/// Display form: `"528Hz"` below 1 kHz, `"1.5kHz"` from 1 kHz up.
pub fn format_frequency(frequency_hz: f64) -> String {
    if frequency_hz >= 1000.0 {
        format!("{:.1}kHz", frequency_hz / 1000.0)
    } else {
        format!("{}Hz", frequency_hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_wave_length_and_amplitude() {
        let samples = generate_sine_wave(528.0, TONE_LOOP_SECONDS, TONE_SAMPLE_RATE);
        assert_eq!(samples.len(), 5512);
        assert_eq!(samples[0], 0.0);
        assert!(samples.iter().all(|s| s.abs() <= TONE_AMPLITUDE));
        assert!(samples.iter().any(|s| *s > 0.2));
    }

    #[test]
    fn test_wav_header() {
        let samples = generate_sine_wave(440.0, 0.5, 160);
        let wav = encode_wav(&samples, 160);

        assert_eq!(samples.len(), 80);
        assert_eq!(wav.len(), WAV_HEADER_LEN + 160);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]), 36 + 160);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(u16::from_le_bytes([wav[22], wav[23]]), 1);
        assert_eq!(u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]), 160);
        assert_eq!(u16::from_le_bytes([wav[34], wav[35]]), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 160);
    }

    #[test]
    fn test_wav_sample_scaling() {
        let wav = encode_wav(&[0.0, 0.25, -0.25, 1.0], 11_025);
        let pcm: Vec<i16> = wav[WAV_HEADER_LEN..]
            .chunks(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(pcm, vec![0, 8191, -8191, 32767]);
    }

    #[test]
    fn test_render_tone_uses_loop_defaults() {
        assert_eq!(render_tone(174.0).len(), WAV_HEADER_LEN + 5512 * 2);
    }

    #[test]
    fn test_frequency_to_note() {
        assert_eq!(frequency_to_note(440.0), "A4");
        assert_eq!(frequency_to_note(432.0), "A4");
        assert_eq!(frequency_to_note(261.63), "C4");
        assert_eq!(frequency_to_note(528.0), "C5");
        assert_eq!(frequency_to_note(0.0), "");
        assert_eq!(frequency_to_note(-10.0), "");
    }

    #[test]
    fn test_frequency_to_note_below_c0() {
        // Schumann resonance sits under the lowest octave
        assert_eq!(frequency_to_note(7.83), "B-2");
    }

    #[test]
    fn test_is_valid_frequency() {
        assert!(is_valid_frequency(20.0));
        assert!(is_valid_frequency(528.0));
        assert!(is_valid_frequency(20_000.0));
        assert!(!is_valid_frequency(7.83));
        assert!(!is_valid_frequency(20_000.5));
        assert!(!is_valid_frequency(f64::NAN));
    }

    #[test]
    fn test_format_frequency() {
        assert_eq!(format_frequency(528.0), "528Hz");
        assert_eq!(format_frequency(136.1), "136.1Hz");
        assert_eq!(format_frequency(1000.0), "1.0kHz");
        assert_eq!(format_frequency(1500.0), "1.5kHz");
    }
}
