use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use tracing::{debug, error};

use crate::capture::{AudioHost, AudioHostError, CaptureError, InputStream};
use crate::config::ReverbConfig;
use crate::graph::EffectsGraph;

/// Default host of the platform, through cpal.
///
/// The input callback downmixes the microphone to mono and pushes it into a
/// ring buffer. The output callback drains it through the effects graph.
pub struct CpalHost {
  host: cpal::Host,
  ring_buffer_secs: f32,
}

impl CpalHost {
  pub fn new(config: &ReverbConfig) -> Self {
    Self { host: cpal::default_host(), ring_buffer_secs: config.ring_buffer_secs }
  }
}

impl Default for CpalHost {
  fn default() -> Self {
    Self::new(&ReverbConfig::default())
  }
}

pub struct CpalInput {
  stream: Option<cpal::Stream>,
  consumer: Option<HeapCons<f32>>,
  sample_rate: u32,
}

impl InputStream for CpalInput {
  fn sample_rate(&self) -> u32 {
    self.sample_rate
  }

  fn stop(&mut self) {
    if let Some(stream) = self.stream.take() {
      if let Err(e) = stream.pause() {
        debug!("Pausing microphone stream failed: {e}");
      }
    }
    self.consumer = None;
  }

  fn is_live(&self) -> bool {
    self.stream.is_some()
  }
}

/// Output stream of the effects graph. Dropping it stops the output.
pub struct CpalRender {
  _stream: cpal::Stream,
}

impl AudioHost for CpalHost {
  type Input = CpalInput;
  type Render = CpalRender;

  fn request_input(&mut self) -> Result<CpalInput, CaptureError> {
    let device = self
      .host
      .default_input_device()
      .ok_or_else(|| CaptureError::Unavailable("no input device".into()))?;

    let supported = device.default_input_config().map_err(|e| CaptureError::Unavailable(e.to_string()))?;
    let sample_rate = supported.sample_rate().0;
    let format = supported.sample_format();
    let config: StreamConfig = supported.into();

    let capacity = ((sample_rate as f32 * self.ring_buffer_secs) as usize).max(1024);
    let (producer, consumer) = HeapRb::<f32>::new(capacity).split();

    let stream = match format {
      SampleFormat::F32 => build_input::<f32>(&device, &config, producer),
      SampleFormat::I16 => build_input::<i16>(&device, &config, producer),
      SampleFormat::U16 => build_input::<u16>(&device, &config, producer),
      other => return Err(CaptureError::Unavailable(format!("unsupported sample format {other:?}"))),
    }?;

    stream.play().map_err(|e| CaptureError::Denied(e.to_string()))?;
    debug!(sample_rate, channels = config.channels, "Microphone stream started");

    Ok(CpalInput { stream: Some(stream), consumer: Some(consumer), sample_rate })
  }

  fn start_render(&mut self, input: &mut CpalInput, graph: EffectsGraph) -> Result<CpalRender, AudioHostError> {
    let consumer = input
      .consumer
      .take()
      .ok_or_else(|| AudioHostError::Stream("microphone already rendered".into()))?;

    let device = self
      .host
      .default_output_device()
      .ok_or_else(|| AudioHostError::Unavailable("no output device".into()))?;

    let supported = device.default_output_config().map_err(|e| AudioHostError::Unavailable(e.to_string()))?;
    let format = supported.sample_format();
    let mut config: StreamConfig = supported.into();
    // no resampling between mic and speakers
    config.sample_rate = cpal::SampleRate(input.sample_rate);

    let stream = match format {
      SampleFormat::F32 => build_output::<f32>(&device, &config, consumer, graph),
      SampleFormat::I16 => build_output::<i16>(&device, &config, consumer, graph),
      SampleFormat::U16 => build_output::<u16>(&device, &config, consumer, graph),
      other => return Err(AudioHostError::Unavailable(format!("unsupported sample format {other:?}"))),
    }?;

    stream.play().map_err(|e| AudioHostError::Stream(e.to_string()))?;
    debug!(sample_rate = input.sample_rate, channels = config.channels, "Effects output started");

    Ok(CpalRender { _stream: stream })
  }
}

fn build_input<T>(
  device: &cpal::Device,
  config: &StreamConfig,
  mut producer: HeapProd<f32>,
) -> Result<cpal::Stream, CaptureError>
where
  T: SizedSample,
  f32: FromSample<T>,
{
  let channels = usize::from(config.channels).max(1);

  device
    .build_input_stream(
      config,
      move |data: &[T], _: &cpal::InputCallbackInfo| {
        for frame in data.chunks(channels) {
          let sum: f32 = frame.iter().map(|s| s.to_sample::<f32>()).sum();
          // a full buffer drops the newest samples
          let _ = producer.try_push(sum / frame.len() as f32);
        }
      },
      |err| error!("Microphone stream error: {err}"),
      None,
    )
    .map_err(|e| match e {
      cpal::BuildStreamError::DeviceNotAvailable => CaptureError::Unavailable(e.to_string()),
      other => CaptureError::Denied(other.to_string()),
    })
}

fn build_output<T>(
  device: &cpal::Device,
  config: &StreamConfig,
  mut consumer: HeapCons<f32>,
  mut graph: EffectsGraph,
) -> Result<cpal::Stream, AudioHostError>
where
  T: SizedSample + FromSample<f32>,
{
  let mut renderer = ChunkedRenderer::new(usize::from(config.channels));

  device
    .build_output_stream(
      config,
      move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
        renderer.render(&mut graph, |mono| consumer.pop_slice(mono), data);
      },
      |err| error!("Effects output stream error: {err}"),
      None,
    )
    .map_err(|e| AudioHostError::Stream(e.to_string()))
}

/// Frames rendered per pass of the output callback.
const CHUNK_FRAMES: usize = 1024;

/// Runs the graph over device buffers of any size in fixed chunks, so the
/// audio thread never allocates.
struct ChunkedRenderer {
  channels: usize,
  mono: Vec<f32>,
  mixed: Vec<f32>,
}

impl ChunkedRenderer {
  fn new(channels: usize) -> Self {
    let channels = channels.max(1);
    Self { channels, mono: vec![0.0; CHUNK_FRAMES], mixed: vec![0.0; CHUNK_FRAMES * channels] }
  }

  /// `pull` fills microphone samples and returns how many it had. Missing
  /// samples are silence.
  fn render<T, F>(&mut self, graph: &mut EffectsGraph, mut pull: F, data: &mut [T])
  where
    T: SizedSample + FromSample<f32>,
    F: FnMut(&mut [f32]) -> usize,
  {
    for out in data.chunks_mut(CHUNK_FRAMES * self.channels) {
      let frames = out.len().div_ceil(self.channels);
      let mono = &mut self.mono[..frames];
      let popped = pull(mono);
      mono[popped..].fill(0.0);

      let mixed = &mut self.mixed[..out.len()];
      graph.render_interleaved(mono, mixed, self.channels);
      for (sample, &value) in out.iter_mut().zip(mixed.iter()) {
        *sample = T::from_sample(value);
      }
    }
  }
}
