// src/codec/wav.rs
//! WAV codec backed by `hound`

use super::AudioCodec;
use crate::buffer::SampleBuffer;
use crate::config::constants::codec::{MAX_CHANNELS, PCM16_SCALE, PCM24_SCALE, PCM32_SCALE, PCM8_SCALE};
use crate::config::{CodecConfig, OutputFormat};
use crate::error::{BandlimitErrorBuilder, BandlimitResult};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;
use tracing::debug;

/// Integer and float WAV reader, 16-bit or float writer
#[derive(Debug, Clone, Copy, Default)]
pub struct WavCodec {
    output_format: OutputFormat,
}

impl WavCodec {
    pub fn new(output_format: OutputFormat) -> Self {
        Self { output_format }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::new(config.output_format)
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    fn read_samples(bytes: &[u8]) -> Result<(WavSpec, Vec<f64>), hound::Error> {
        let mut reader = WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();

        let samples = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .map(|s| s.map(f64::from))
                .collect::<Result<Vec<_>, _>>()?,
            (SampleFormat::Int, bits) => {
                let scale = match bits {
                    8 => PCM8_SCALE,
                    16 => PCM16_SCALE,
                    24 => PCM24_SCALE,
                    32 => PCM32_SCALE,
                    _ => return Err(hound::Error::Unsupported),
                };
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f64 / scale))
                    .collect::<Result<Vec<_>, _>>()?
            }
            _ => return Err(hound::Error::Unsupported),
        };

        Ok((spec, samples))
    }

    fn write_samples(&self, buffer: &SampleBuffer) -> Result<Vec<u8>, hound::Error> {
        let spec = WavSpec {
            channels: buffer.channels() as u16,
            sample_rate: buffer.sample_rate(),
            bits_per_sample: match self.output_format {
                OutputFormat::Pcm16 => 16,
                OutputFormat::Float32 => 32,
            },
            sample_format: match self.output_format {
                OutputFormat::Pcm16 => SampleFormat::Int,
                OutputFormat::Float32 => SampleFormat::Float,
            },
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec)?;
            // Frame-major iteration interleaves the channels
            for &sample in buffer.samples().iter() {
                let clamped = sample.clamp(-1.0, 1.0);
                match self.output_format {
                    OutputFormat::Pcm16 => writer.write_sample((clamped * (PCM16_SCALE - 1.0)).round() as i16)?,
                    OutputFormat::Float32 => writer.write_sample(clamped as f32)?,
                }
            }
            writer.finalize()?;
        }

        Ok(cursor.into_inner())
    }
}

impl AudioCodec for WavCodec {
    fn name(&self) -> &'static str {
        "wav"
    }

    fn decode(&self, bytes: &[u8]) -> BandlimitResult<SampleBuffer> {
        let errors = || BandlimitErrorBuilder::new("wav_codec", "decode");

        let (spec, samples) = Self::read_samples(bytes).map_err(|e| errors().decode(e.to_string()))?;
        if spec.channels == 0 {
            return Err(errors().decode("container declares zero channels"));
        }

        debug!(
            sample_rate = spec.sample_rate,
            channels = spec.channels,
            bits = spec.bits_per_sample,
            samples = samples.len(),
            "decoded wav"
        );

        SampleBuffer::from_interleaved(samples, spec.channels as usize, spec.sample_rate)
            .map_err(|e| errors().decode(e.to_string()))
    }

    fn encode(&self, buffer: &SampleBuffer) -> BandlimitResult<Vec<u8>> {
        let errors = || BandlimitErrorBuilder::new("wav_codec", "encode");

        if buffer.channels() > MAX_CHANNELS as usize {
            return Err(errors().encode(format!(
                "{} channels exceeds the supported maximum of {}",
                buffer.channels(),
                MAX_CHANNELS
            )));
        }

        let bytes = self.write_samples(buffer).map_err(|e| errors().encode(e.to_string()))?;
        debug!(
            sample_rate = buffer.sample_rate(),
            channels = buffer.channels(),
            format = ?self.output_format,
            bytes = bytes.len(),
            "encoded wav"
        );
        Ok(bytes)
    }
}
