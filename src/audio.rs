//! Audible send/receive cues. Short synthesized sine sweeps, played on a
//! throwaway thread. Sound is a UX nicety: every failure here is swallowed.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::conversation::Cue;

const CUE_SECS: f32 = 0.1;
const START_GAIN: f32 = 0.3;
const END_GAIN: f32 = 0.01;

/// Play a cue without blocking the caller. Failures are logged only when
/// NUTRICHAT_DEBUG is set.
pub fn play(cue: Cue) {
    std::thread::spawn(move || {
        if let Err(e) = play_blocking(cue) {
            if std::env::var("NUTRICHAT_DEBUG").is_ok() {
                eprintln!("[audio] cue failed: {}", e);
            }
        }
    });
}

fn play_blocking(cue: Cue) -> anyhow::Result<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("no output device"))?;
    let config = device.default_output_config()?;

    if config.sample_format() != cpal::SampleFormat::F32 {
        // Only f32 output is supported; skip the cue elsewhere.
        return Ok(());
    }

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let (start_hz, end_hz) = match cue {
        Cue::Send => (800.0f32, 400.0f32),
        Cue::Receive => (400.0f32, 600.0f32),
    };

    let total_frames = (sample_rate * CUE_SECS) as usize;
    let mut phase = 0.0f32;
    let mut frame_index = 0usize;

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            for frame in data.chunks_mut(channels) {
                let sample = if frame_index < total_frames {
                    let progress = frame_index as f32 / total_frames as f32;
                    // Exponential sweep and decay, same shape for both cues.
                    let freq = start_hz * (end_hz / start_hz).powf(progress);
                    let gain = START_GAIN * (END_GAIN / START_GAIN).powf(progress);
                    phase = (phase + freq / sample_rate) % 1.0;
                    (phase * std::f32::consts::TAU).sin() * gain
                } else {
                    0.0
                };
                for out in frame.iter_mut() {
                    *out = sample;
                }
                frame_index += 1;
            }
        },
        |e| {
            if std::env::var("NUTRICHAT_DEBUG").is_ok() {
                eprintln!("[audio] stream error: {}", e);
            }
        },
        None,
    )?;

    stream.play()?;
    std::thread::sleep(std::time::Duration::from_millis(150));
    Ok(())
}
