use std::path::Path;

use claxon::FlacReader;

use crate::error::SyncError;
use crate::types::AudioInput;

/// Decodes a WAV or FLAC file and downmixes it to mono `f32` in [-1, 1].
pub fn load_audio(path: &Path) -> Result<AudioInput, SyncError> {
    if !path.is_file() {
        return Err(SyncError::AudioNotFound {
            path: path.to_path_buf(),
        });
    }
    let is_flac = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("flac"));
    let audio = if is_flac {
        read_flac_mono(path)?
    } else {
        read_wav_mono(path)?
    };
    tracing::debug!(
        path = %path.display(),
        sample_rate_hz = audio.sample_rate_hz,
        duration_sec = format!("{:.2}", audio.duration_sec()),
        "audio loaded"
    );
    Ok(audio)
}

fn int_scale(bits_per_sample: u32) -> f32 {
    if bits_per_sample > 1 {
        ((1_i64 << (bits_per_sample - 1)) - 1) as f32
    } else {
        1.0
    }
}

fn downmix(interleaved: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved;
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn read_flac_mono(path: &Path) -> Result<AudioInput, SyncError> {
    let mut reader = FlacReader::open(path).map_err(|e| SyncError::audio("open flac", e))?;
    let info = reader.streaminfo();
    let channels = info.channels as usize;
    if channels == 0 {
        return Err(SyncError::audio("read flac", "zero channels"));
    }
    let scale = int_scale(info.bits_per_sample);
    let interleaved = reader
        .samples()
        .map(|s| s.map(|v| v as f32 / scale))
        .collect::<Result<Vec<f32>, _>>()
        .map_err(|e| SyncError::audio("decode flac", e))?;
    Ok(AudioInput::new(info.sample_rate, downmix(interleaved, channels)))
}

fn read_wav_mono(path: &Path) -> Result<AudioInput, SyncError> {
    let mut reader = hound::WavReader::open(path).map_err(|e| SyncError::audio("open wav", e))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(SyncError::audio("read wav", "zero channels"));
    }
    let interleaved = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|e| SyncError::audio("decode wav", e))?,
        hound::SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample as u32);
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|e| SyncError::audio("decode wav", e))?
        }
    };
    Ok(AudioInput::new(spec.sample_rate, downmix(interleaved, channels)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(name: &str, channels: u16, frames: &[[i16; 2]]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let spec = hound::WavSpec {
            channels,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).expect("create wav");
        for frame in frames {
            for &s in &frame[..channels as usize] {
                writer.write_sample(s).expect("write sample");
            }
        }
        writer.finalize().expect("finalize wav");
        path
    }

    #[test]
    fn missing_file_is_audio_not_found() {
        let err = load_audio(Path::new("/nonexistent/vocals.wav")).unwrap_err();
        assert!(matches!(err, SyncError::AudioNotFound { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn stereo_wav_is_downmixed() {
        let path = write_wav(
            "lyrics_sync_rs_stereo.wav",
            2,
            &[[32767, 0], [-32767, -32767], [16384, 16384]],
        );
        let audio = load_audio(&path).expect("load wav");
        assert_eq!(audio.sample_rate_hz, 8_000);
        assert_eq!(audio.samples.len(), 3);
        assert!((audio.samples[0] - 0.5).abs() < 1e-4);
        assert!((audio.samples[1] + 1.0).abs() < 1e-4);
        assert!((audio.samples[2] - 0.5).abs() < 1e-3);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn garbage_wav_is_fatal_decode_error() {
        let path = std::env::temp_dir().join("lyrics_sync_rs_garbage.wav");
        std::fs::write(&path, b"not a riff file").expect("write garbage");
        let err = load_audio(&path).unwrap_err();
        assert!(matches!(err, SyncError::Audio { .. }));
        assert!(err.is_fatal());
        let _ = std::fs::remove_file(&path);
    }
}
