//! Lock-step link to the pose predictor.
//!
//! One dedicated worker thread connects once, then repeats: read the current
//! control vector, send its 16 byte frame, block until the full 180 byte
//! response has arrived, decode it and publish it. There is never more than
//! one request in flight, so the next response read always belongs to the
//! last request written.
//!
//! ```text
//! Disconnected -> Connecting -> Connected -> Closing -> Closed
//!                     \______________\___________________/
//!                        connect or io fault ends the worker
//! ```
//!
//! The link is not re-established after a fault. Stopping flips a cooperative
//! flag and shuts the socket down, which wakes a worker parked in a blocking
//! read, then waits a bounded time for the worker to exit.

use crate::codec::{self, POSE_FRAME_LEN};
use crate::config::ControllerConfig;
use crate::error::{Error, Result};
use crate::sample::ControlSource;
use crate::slot::{Published, PublishedPose};
use crate::types::{Joint, PoseVector};
use log::*;
use parking_lot::Mutex;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ClientState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    Closing = 3,
    Closed = 4,
}

impl ClientState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ClientState::Disconnected,
            1 => ClientState::Connecting,
            2 => ClientState::Connected,
            3 => ClientState::Closing,
            _ => ClientState::Closed,
        }
    }
}

/// State touched by both the worker and the owning side.
struct Shared {
    stop: AtomicBool,
    state: AtomicU8,
    /// Second handle on the worker's socket, only used to shut it down.
    stream: Mutex<Option<TcpStream>>,
    fault: Mutex<Option<Error>>,
}

impl Shared {
    fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            state: AtomicU8::new(ClientState::Disconnected as u8),
            stream: Mutex::new(None),
            fault: Mutex::new(None),
        }
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn state(&self) -> ClientState {
        ClientState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: ClientState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    /// Worker side progress. Refused once stop has been requested or the
    /// link is already winding down, so `Closing` is never overwritten.
    fn advance_state(&self, state: ClientState) -> bool {
        self.state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                if self.stop_requested() || current >= ClientState::Closing as u8 {
                    None
                } else {
                    Some(state as u8)
                }
            })
            .is_ok()
    }

    /// Moves to `Closing` unless the worker already finished.
    fn begin_closing(&self) {
        let _ = self
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                if current == ClientState::Closed as u8 {
                    None
                } else {
                    Some(ClientState::Closing as u8)
                }
            });
    }

    /// Hands the worker's socket over for shutdown. Refused once stop has
    /// been requested so a late connect can't escape `close_stream`.
    fn register_stream(&self, stream: &TcpStream) -> Result<bool> {
        let mut slot = self.stream.lock();
        if self.stop_requested() {
            return Ok(false);
        }
        *slot = Some(stream.try_clone()?);
        Ok(true)
    }

    /// Safe to call any number of times from either side.
    fn close_stream(&self) {
        if let Some(stream) = self.stream.lock().take() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                trace!("Socket shutdown: {}", e);
            }
        }
    }
}

pub struct SyncClient {
    endpoint: String,
    shared: Arc<Shared>,
    published: Arc<PublishedPose>,
    join_handle: Option<JoinHandle<()>>,
    worker_done: Receiver<()>,
    shutdown_timeout: Duration,
}

impl SyncClient {
    /// Spawns the worker. Connecting happens on the worker, so a refused or
    /// unreachable endpoint shows up as a `Closed` state with a
    /// [`Error::Connect`] fault rather than as an error here.
    pub fn start<S>(config: &ControllerConfig, source: S) -> Result<Self>
    where
        S: ControlSource + 'static,
    {
        let endpoint = config.endpoint();
        let connect_timeout = config.connect_timeout();
        let shared = Arc::new(Shared::new());
        let published = Arc::new(PublishedPose::new());
        let (done_tx, worker_done) = mpsc::channel();

        let worker = Worker {
            endpoint: endpoint.clone(),
            connect_timeout,
            source,
            shared: Arc::clone(&shared),
            published: Arc::clone(&published),
        };
        let join_handle = thread::Builder::new()
            .name("predictor-link".to_string())
            .spawn(move || worker.run(done_tx))
            .map_err(Error::Spawn)?;

        info!("Predictor link started for {}", endpoint);
        Ok(Self {
            endpoint,
            shared,
            published,
            join_handle: Some(join_handle),
            worker_done,
            shutdown_timeout: config.shutdown_timeout(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> ClientState {
        self.shared.state()
    }

    /// Once per tick. Returns a pose only if one arrived since the last poll.
    pub fn poll(&self) -> Option<PoseVector> {
        self.published.take().map(|published| published.pose)
    }

    pub fn poll_published(&self) -> Option<Published> {
        self.published.take()
    }

    pub fn latest(&self) -> Option<Published> {
        self.published.latest()
    }

    /// The fault that ended the worker. Errors caused by stopping are never
    /// recorded here.
    pub fn take_fault(&self) -> Option<Error> {
        self.shared.fault.lock().take()
    }

    pub fn stop(&mut self) {
        let join_handle = match self.join_handle.take() {
            Some(handle) => handle,
            None => return,
        };
        self.shared.stop.store(true, Ordering::SeqCst);
        self.shared.begin_closing();
        self.shared.close_stream();

        match self.worker_done.recv_timeout(self.shutdown_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if join_handle.join().is_err() {
                    error!("Predictor link worker panicked");
                }
                info!("Predictor link to {} stopped", self.endpoint);
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "Predictor link worker still busy after {:?}, detaching it",
                    self.shutdown_timeout
                );
            }
        }
    }
}

impl Drop for SyncClient {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker<S> {
    endpoint: String,
    connect_timeout: Option<Duration>,
    source: S,
    shared: Arc<Shared>,
    published: Arc<PublishedPose>,
}

impl<S: ControlSource> Worker<S> {
    fn run(self, done: Sender<()>) {
        self.shared.advance_state(ClientState::Connecting);
        match self.connect_and_cycle() {
            Ok(()) => debug!("Predictor link worker exiting"),
            Err(e) if self.shared.stop_requested() => {
                debug!("Ignoring error during shutdown: {}", e)
            }
            Err(e) => {
                if e.is_disconnect() {
                    warn!("Predictor at {} went away: {}", self.endpoint, e);
                } else {
                    error!("Predictor link failed: {}", e);
                }
                *self.shared.fault.lock() = Some(e);
            }
        }
        self.shared.close_stream();
        self.shared.set_state(ClientState::Closed);
        drop(done);
    }

    fn connect_and_cycle(&self) -> Result<()> {
        let mut stream = connect(&self.endpoint, self.connect_timeout)?;
        if !self.shared.register_stream(&stream)? {
            return Ok(());
        }
        if !self.shared.advance_state(ClientState::Connected) {
            return Ok(());
        }
        info!("Connected to predictor at {}", self.endpoint);
        run_cycles(
            &mut stream,
            &self.source,
            &self.published,
            &self.shared.stop,
        )
    }
}

fn connect(endpoint: &str, timeout: Option<Duration>) -> Result<TcpStream> {
    let connect_error = |source: io::Error| Error::Connect {
        endpoint: endpoint.to_owned(),
        source,
    };
    let stream = match timeout {
        None => TcpStream::connect(endpoint).map_err(connect_error)?,
        Some(timeout) => {
            let mut last_error =
                io::Error::new(io::ErrorKind::NotFound, "endpoint resolved to no addresses");
            let mut connected = None;
            for address in endpoint.to_socket_addrs().map_err(connect_error)? {
                match TcpStream::connect_timeout(&address, timeout) {
                    Ok(stream) => {
                        connected = Some(stream);
                        break;
                    }
                    Err(e) => last_error = e,
                }
            }
            connected.ok_or_else(|| connect_error(last_error))?
        }
    };
    // Frames are tiny and strictly alternating
    stream.set_nodelay(true)?;
    Ok(stream)
}

/// Runs request/response cycles until `stop` is set or the stream fails.
fn run_cycles<T, S>(
    stream: &mut T,
    source: &S,
    published: &PublishedPose,
    stop: &AtomicBool,
) -> Result<()>
where
    T: Read + Write,
    S: ControlSource + ?Sized,
{
    let mut response = [0u8; POSE_FRAME_LEN];
    let mut cycle = 0u64;
    while !stop.load(Ordering::SeqCst) {
        let control = source.control();
        stream.write_all(&codec::encode_control(&control))?;
        read_frame(stream, &mut response)?;
        let pose = codec::decode_pose(&response)?;
        debug!(
            "Received pose #{}: thumb1={:.2} index1={:.2} middle1={:.2}",
            cycle,
            pose.euler_degrees(Joint::Thumb1).x,
            pose.euler_degrees(Joint::Index1).x,
            pose.euler_degrees(Joint::Middle1).x
        );
        published.publish(Published { cycle, pose });
        cycle += 1;
    }
    Ok(())
}

/// Fills `frame` completely, however the stream chooses to split it. A read
/// of zero bytes means the peer closed and is fatal, even mid-frame.
fn read_frame<R: Read + ?Sized>(reader: &mut R, frame: &mut [u8]) -> Result<()> {
    let mut received = 0;
    while received < frame.len() {
        match reader.read(&mut frame[received..]) {
            Ok(0) => {
                return Err(Error::PeerDisconnected {
                    received,
                    expected: frame.len(),
                })
            }
            Ok(n) => received += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
