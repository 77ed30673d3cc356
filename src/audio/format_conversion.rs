// Format conversion for cpal output streams
//
// The mixer renders mono f32; devices want interleaved f32, i16 or u16.
// Conversion goes through cpal's `FromSample`, allocation-free.

use cpal::{FromSample, Sample};

/// Writes one mono sample to every channel of an interleaved frame
#[inline]
pub fn write_mono_to_interleaved_frame<T>(internal_sample: f32, output_frame: &mut [T])
where
    T: Sample + FromSample<f32>,
{
    for channel_sample in output_frame.iter_mut() {
        *channel_sample = T::from_sample(internal_sample);
    }
}

/// Fills an interleaved buffer with silence
#[inline]
pub fn write_silence<T>(output: &mut [T])
where
    T: Sample,
{
    for sample in output.iter_mut() {
        *sample = T::EQUILIBRIUM;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_mono_to_interleaved() {
        let mut output: [f32; 2] = [0.0; 2];
        write_mono_to_interleaved_frame(0.5, &mut output);
        assert_eq!(output, [0.5, 0.5]);

        let mut output_i16: [i16; 2] = [0; 2];
        write_mono_to_interleaved_frame(0.5, &mut output_i16);
        assert!(output_i16[0] > 0);
        assert_eq!(output_i16[0], output_i16[1]);
    }

    #[test]
    fn test_silence_per_format() {
        let mut output_u16: [u16; 4] = [0; 4];
        write_silence(&mut output_u16);
        assert!(output_u16.iter().all(|&s| s == u16::EQUILIBRIUM));

        let mut output_f32: [f32; 3] = [0.7; 3];
        write_silence(&mut output_f32);
        assert_eq!(output_f32, [0.0; 3]);
    }
}
