use cpal::traits::{DeviceTrait, HostTrait};

pub use cpal::Stream;

use crate::errors::RecorderError;

/// Source is an audio input source.
pub struct Source {
    device: cpal::Device,
}

impl Source {
    pub fn new(select_device: Option<&str>) -> Result<Self, RecorderError> {
        let host = cpal::default_host();

        let device = if let Some(device_name) = select_device {
            Self::list_devices()?
                .into_iter()
                .map(|x| x.1)
                .flatten()
                .filter(|d| d.name().map(|name| name == device_name).unwrap_or(false))
                .next()
                .ok_or_else(|| {
                    RecorderError::DeviceUnavailable(format!(
                        "no input device with name '{}' was found",
                        device_name
                    ))
                })
        } else {
            host.default_input_device().ok_or_else(|| {
                RecorderError::DeviceUnavailable("could not get default input".to_owned())
            })
        }?;

        Ok(Self { device })
    }

    /// Builds a capture stream delivering signed 16-bit samples to
    /// `handle_samples` on the stream's own delivery thread. The stream is
    /// not played here; the caller starts and stops it.
    pub fn get_stream(
        &self,
        channels: u16,
        sample_rate: u32,
        buffer_size: u32,
        handle_samples: Box<dyn Fn(&[i16]) -> () + Send>,
    ) -> Result<Stream, RecorderError> {
        let config = cpal::StreamConfig {
            buffer_size: cpal::BufferSize::Fixed(buffer_size),
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
        };

        let stream = self.device.build_input_stream(
            &config,
            move |data: &[i16], _: &_| {
                handle_samples(data);
            },
            move |err| {
                log::error!("audio stream error: {}", err);
            },
        )?;

        Ok(stream)
    }

    pub fn list_devices(
    ) -> Result<Vec<(cpal::HostId, cpal::InputDevices<cpal::Devices>)>, RecorderError> {
        let mut hosts = Vec::new();
        for &host_id in cpal::available_hosts().iter() {
            let host = cpal::host_from_id(host_id).map_err(|e| {
                RecorderError::DeviceUnavailable(format!("could not get host: {}", e))
            })?;
            let devices = host.input_devices().map_err(|e| {
                RecorderError::DeviceUnavailable(format!("could not list input devices: {}", e))
            })?;
            hosts.push((host_id, devices));
        }
        Ok(hosts)
    }
}
