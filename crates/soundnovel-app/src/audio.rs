//! rodio 오디오 출력 채널 (`rodio` feature).
//!
//! `OutputStream`은 스레드 간 이동이 불가하므로 전용 스레드가 소유하고,
//! 채널은 `OutputStreamHandle`로 재생할 때마다 `Sink`를 새로 만든다.
//! 감시 스레드가 `Sink::empty()`를 확인해, 반복 중이면 처음부터 다시 붙이고
//! 아니면 자연 종료를 알린다. 반복 설정은 재생 중에도 다음 끝에서 반영된다.

use parking_lot::Mutex;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use soundnovel_core::error::CoreError;
use soundnovel_core::models::asset::AssetBase;
use soundnovel_core::ports::audio::{AudioChannel, EndedHandler};
use std::fs::File;
use std::io::BufReader;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 종료 감시 주기
const WATCH_INTERVAL: Duration = Duration::from_millis(50);

/// 로컬 파일 디코더 열기
fn open_decoder(src: &str) -> Result<Decoder<BufReader<File>>, CoreError> {
    let path = AssetBase::local_path(src)
        .ok_or_else(|| CoreError::Playback(format!("로컬 파일이 아닌 주소: {src}")))?;
    let file = File::open(&path)?;
    Decoder::new(BufReader::new(file))
        .map_err(|e| CoreError::Playback(format!("디코딩 실패: {}: {e}", path.display())))
}

/// 기본 출력 장치 열기. 스트림 소유 스레드는 프로세스가 끝날 때까지 유지된다.
pub fn open_output() -> Result<OutputStreamHandle, CoreError> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("soundnovel-audio".to_string())
        .spawn(move || match OutputStream::try_default() {
            Ok((stream, handle)) => {
                let _ = tx.send(Ok(handle));
                let _stream = stream;
                loop {
                    thread::park();
                }
            }
            Err(e) => {
                let _ = tx.send(Err(CoreError::Playback(format!("출력 장치 열기 실패: {e}"))));
            }
        })?;

    rx.recv()
        .map_err(|e| CoreError::Internal(format!("오디오 스레드 응답 없음: {e}")))?
}

#[derive(Default)]
struct ChannelState {
    source: Option<String>,
    sink: Option<Arc<Sink>>,
    volume: f32,
    looping: bool,
    /// 다음 `play()`에서 처음부터 다시 열어야 하는지
    rewind: bool,
}

/// 곡이 끝까지 재생된 뒤 할 일
#[derive(Debug, PartialEq, Eq)]
enum Drained {
    /// 같은 소스를 처음부터 다시 붙인다
    Requeue(String),
    /// 종료 핸들러 호출
    Finish,
}

impl ChannelState {
    /// 재생 도중 바뀐 반복 설정도 여기서 반영된다
    fn on_drained(&self) -> Drained {
        match (&self.source, self.looping) {
            (Some(src), true) => Drained::Requeue(src.clone()),
            _ => Drained::Finish,
        }
    }
}

/// rodio 기반 채널
pub struct RodioChannel {
    name: &'static str,
    handle: OutputStreamHandle,
    state: Arc<Mutex<ChannelState>>,
    ended: Arc<Mutex<Option<EndedHandler>>>,
    /// sink가 바뀔 때마다 증가 (지난 감시 스레드 무시)
    generation: Arc<AtomicU64>,
}

impl RodioChannel {
    pub fn new(name: &'static str, handle: OutputStreamHandle) -> Self {
        Self {
            name,
            handle,
            state: Arc::new(Mutex::new(ChannelState {
                volume: 1.0,
                ..Default::default()
            })),
            ended: Arc::new(Mutex::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    fn open_sink(&self, state: &ChannelState, src: &str) -> Result<Arc<Sink>, CoreError> {
        let decoder = open_decoder(src)?;
        let sink = Sink::try_new(&self.handle)
            .map_err(|e| CoreError::Playback(format!("출력 생성 실패: {e}")))?;

        sink.set_volume(state.volume);
        sink.append(decoder);
        Ok(Arc::new(sink))
    }

    fn watch(&self, sink: Arc<Sink>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = self.generation.clone();
        let state = self.state.clone();
        let ended = self.ended.clone();
        let name = self.name;

        thread::spawn(move || loop {
            thread::sleep(WATCH_INTERVAL);
            {
                // sink 교체는 상태 잠금 아래에서 일어나므로 세대 확인도 잠금 안에서
                let state = state.lock();
                if current.load(Ordering::SeqCst) != generation {
                    return;
                }
                if !sink.empty() {
                    continue;
                }
                if let Drained::Requeue(src) = state.on_drained() {
                    match open_decoder(&src) {
                        Ok(decoder) => {
                            debug!("[{name}] 반복 재생: {src}");
                            sink.append(decoder);
                            continue;
                        }
                        Err(e) => warn!("[{name}] 반복 재생 실패: {e}"),
                    }
                }
            }

            debug!("[{name}] 재생 종료");
            let handler = ended.lock().take();
            if let Some(handler) = handler {
                handler();
            }
            return;
        });
    }

    fn drop_sink(&self, state: &mut ChannelState) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(sink) = state.sink.take() {
            sink.stop();
        }
    }
}

impl AudioChannel for RodioChannel {
    fn set_source(&self, src: Option<&str>) {
        let mut state = self.state.lock();
        self.drop_sink(&mut state);
        state.source = src.map(str::to_string);
        state.rewind = false;
    }

    fn play(&self) -> Result<(), CoreError> {
        let mut state = self.state.lock();
        if let Some(sink) = state.sink.as_ref().filter(|_| !state.rewind) {
            sink.play();
            return Ok(());
        }

        let src = state
            .source
            .clone()
            .ok_or_else(|| CoreError::Playback(format!("[{}] 소스 없음", self.name)))?;
        self.drop_sink(&mut state);
        let sink = self.open_sink(&state, &src).inspect_err(|e| {
            warn!("[{}] 재생 실패: {e}", self.name);
        })?;
        state.rewind = false;
        state.sink = Some(sink.clone());
        self.watch(sink);
        info!("[{}] 재생: {src}", self.name);
        Ok(())
    }

    fn pause(&self) {
        if let Some(sink) = self.state.lock().sink.as_ref() {
            sink.pause();
        }
    }

    fn seek_start(&self) {
        let mut state = self.state.lock();
        state.rewind = true;
        self.drop_sink(&mut state);
    }

    fn set_volume(&self, volume: f32) {
        let mut state = self.state.lock();
        state.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = state.sink.as_ref() {
            sink.set_volume(state.volume);
        }
    }

    fn set_loop(&self, looping: bool) {
        // 감시 스레드가 곡 끝에서 읽는다
        self.state.lock().looping = looping;
    }

    fn on_ended(&self, handler: Option<EndedHandler>) {
        *self.ended.lock() = handler;
    }
}
