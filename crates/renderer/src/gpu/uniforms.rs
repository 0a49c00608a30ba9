use bytemuck::{Pod, Zeroable};
use chrono::{Datelike, Local, Timelike};

use crate::runtime::TimeSample;
use crate::types::{CHANNEL_COUNT, SAMPLE_RATE};

/// CPU mirror of the std140 `ShadertoyParams` block declared in the wrapped
/// fragment header. Scalar arrays occupy a full vec4 slot per element.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ShadertoyUniforms {
    pub i_resolution: [f32; 3],
    pub i_time: f32,
    pub i_time_delta: f32,
    pub i_frame: i32,
    pub i_sample_rate: f32,
    pub _padding0: f32,
    pub i_mouse: [f32; 4],
    pub i_date: [f32; 4],
    pub i_channel_time: [[f32; 4]; CHANNEL_COUNT],
    pub i_channel_resolution: [[f32; 4]; CHANNEL_COUNT],
}

impl ShadertoyUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        let mut uniforms = Self {
            i_resolution: [width as f32, height as f32, 1.0],
            i_time: 0.0,
            i_time_delta: 0.0,
            i_frame: 0,
            i_sample_rate: SAMPLE_RATE,
            _padding0: 0.0,
            i_mouse: [0.0; 4],
            i_date: [0.0; 4],
            i_channel_time: [[0.0; 4]; CHANNEL_COUNT],
            i_channel_resolution: [[0.0; 4]; CHANNEL_COUNT],
        };
        uniforms.refresh_date();
        uniforms
    }

    /// Updates the viewport size; the pixel aspect ratio stays 1.
    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.i_resolution = [width as f32, height as f32, 1.0];
    }

    pub fn set_mouse(&mut self, mouse: [f32; 4]) {
        self.i_mouse = mouse;
    }

    pub fn apply_time(&mut self, sample: TimeSample) {
        self.i_time = sample.seconds;
        self.i_time_delta = sample.delta;
        self.i_frame = sample.frame.min(i32::MAX as u32) as i32;
        for channel in &mut self.i_channel_time {
            channel[0] = sample.seconds;
        }
    }

    /// Stores (year, month, day, seconds since midnight) in local time.
    /// The month is zero-based, as ShaderToy reports it.
    pub fn refresh_date(&mut self) {
        let local_now = Local::now();
        let seconds_since_midnight = local_now.num_seconds_from_midnight() as f32
            + local_now.nanosecond() as f32 / 1_000_000_000.0;
        self.i_date = [
            local_now.year() as f32,
            local_now.month0() as f32,
            local_now.day() as f32,
            seconds_since_midnight,
        ];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    /// The offsets below are the std140 offsets of the GLSL block.
    #[test]
    fn shadertoy_uniforms_follow_std140_layout() {
        assert_eq!(size_of::<ShadertoyUniforms>(), 192);
        assert_eq!(offset_of!(ShadertoyUniforms, i_resolution), 0);
        assert_eq!(offset_of!(ShadertoyUniforms, i_time), 12);
        assert_eq!(offset_of!(ShadertoyUniforms, i_time_delta), 16);
        assert_eq!(offset_of!(ShadertoyUniforms, i_frame), 20);
        assert_eq!(offset_of!(ShadertoyUniforms, i_sample_rate), 24);
        assert_eq!(offset_of!(ShadertoyUniforms, i_mouse), 32);
        assert_eq!(offset_of!(ShadertoyUniforms, i_date), 48);
        assert_eq!(offset_of!(ShadertoyUniforms, i_channel_time), 64);
        assert_eq!(offset_of!(ShadertoyUniforms, i_channel_resolution), 128);
    }

    #[test]
    fn new_uniforms_report_resolution_and_sample_rate() {
        let uniforms = ShadertoyUniforms::new(800, 600);
        assert_eq!(uniforms.i_resolution, [800.0, 600.0, 1.0]);
        assert_eq!(uniforms.i_sample_rate, 44_100.0);
        assert_eq!(uniforms.i_frame, 0);
        assert!(uniforms.i_date[0] >= 2000.0);
        assert!((0.0..=11.0).contains(&uniforms.i_date[1]));
        assert!((0.0..86_401.0).contains(&uniforms.i_date[3]));
    }

    #[test]
    fn date_month_is_zero_based() {
        let mut uniforms = ShadertoyUniforms::new(1, 1);
        let before = Local::now().month0();
        uniforms.refresh_date();
        let after = Local::now().month0();
        let month = uniforms.i_date[1] as u32;
        assert!(month == before || month == after);
        assert!(month <= 11);
    }

    #[test]
    fn apply_time_mirrors_into_channel_times() {
        let mut uniforms = ShadertoyUniforms::new(1, 1);
        uniforms.apply_time(TimeSample {
            seconds: 2.5,
            delta: 0.016,
            frame: 150,
        });
        assert_eq!(uniforms.i_time, 2.5);
        assert_eq!(uniforms.i_time_delta, 0.016);
        assert_eq!(uniforms.i_frame, 150);
        assert!(uniforms.i_channel_time.iter().all(|slot| slot[0] == 2.5));
    }

    #[test]
    fn resize_keeps_unit_pixel_aspect() {
        let mut uniforms = ShadertoyUniforms::new(800, 600);
        uniforms.set_resolution(1024, 768);
        assert_eq!(uniforms.i_resolution, [1024.0, 768.0, 1.0]);
    }
}
