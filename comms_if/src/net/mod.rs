//! # Network Module
//!
//! The follower and the robot (or simulation) server talk over a single ZMQ request/reply pair:
//! the follower holds the REQ end and the server the REP end. [`MonitoredSocket`] wraps either
//! end and tracks, on a background thread, whether the peer is currently attached. The follower
//! uses this to fail a pose request straight away while the robot is unreachable rather than
//! waiting out the request timeout on every tick.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, warn};
use std::{
    sync::{Arc, atomic::{AtomicBool, AtomicUsize, Ordering}},
    thread
};
use zmq::{Context, Socket, SocketEvent, SocketType};

// Export zmq
pub use zmq;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Receive timeout of the monitor socket. Bounds how long dropping a socket waits for its monitor
/// thread to notice.
const MONITOR_POLL_MS: i32 = 100;

/// Extra time given to the monitor, on top of the connect timeout, to report the outcome of the
/// first connection attempt.
const CONNECT_REPORT_MARGIN_MS: i32 = 500;

/// Unsent messages are discarded when a socket is dropped. A demand that could not be delivered
/// is stale by the next tick anyway.
const LINGER_MS: i32 = 0;

/// Interval between ZMTP heartbeats sent by the follower.
const HEARTBEAT_IVL_MS: i32 = 500;

/// The server is considered gone if it does not answer a heartbeat within this time.
const HEARTBEAT_TIMEOUT_MS: i32 = 1000;

// ------------------------------------------------------------------------------------------------
// STATICS
// ------------------------------------------------------------------------------------------------

/// Source of unique inproc endpoints for the monitors.
static NEXT_MONITOR_ID: AtomicUsize = AtomicUsize::new(0);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One end of the robot request/reply link, with connection monitoring.
///
/// Derefs to the underlying [`zmq::Socket`] for sending and receiving.
pub struct MonitoredSocket {
    socket: Socket,

    /// True while a peer is attached
    connected: Arc<AtomicBool>,

    /// Set on drop to stop the monitor thread
    stop_monitor: Arc<AtomicBool>,

    monitor: Option<thread::JoinHandle<()>>
}

/// How a [`MonitoredSocket`] is set up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SocketOptions {
    pub role: SocketRole,

    /// Milliseconds a receive waits before failing with `EAGAIN`, `-1` to wait forever
    pub recv_timeout_ms: i32,

    /// Milliseconds a send waits before failing with `EAGAIN`
    pub send_timeout_ms: i32
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Which end of the link a socket is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SocketRole {
    /// REP socket bound to the endpoint. Creation does not wait for a client.
    Server,

    /// REQ socket connected to the endpoint. Creation fails if the server has not accepted the
    /// connection within `connect_timeout_ms`.
    Client { connect_timeout_ms: i32 }
}

#[derive(thiserror::Error, Debug)]
pub enum MonitoredSocketError {
    #[error("Could not create the socket: {0}")]
    SocketCreation(zmq::Error),

    #[error("Could not monitor the socket: {0}")]
    Monitor(zmq::Error),

    #[error("Could not set the {0} socket option: {1}")]
    SocketOption(&'static str, zmq::Error),

    #[error("Could not attach to {0}: {1}")]
    Attach(String, zmq::Error),

    #[error("No server accepted the connection to {0}")]
    ServerUnreachable(String)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MonitoredSocket {
    /// Create the socket and attach it to `endpoint`, for example `"tcp://localhost:5020"`.
    ///
    /// Servers bind and return immediately. Clients connect and block until the server accepts
    /// the connection or the connect timeout expires.
    pub fn new(
        ctx: &Context,
        options: SocketOptions,
        endpoint: &str
    ) -> Result<Self, MonitoredSocketError> {

        let socket = ctx.socket(options.role.socket_type())
            .map_err(MonitoredSocketError::SocketCreation)?;

        // The monitor must be attached before the socket so that the first connection is seen
        let monitor_endpoint = format!(
            "inproc://robot_link_monitor_{}",
            NEXT_MONITOR_ID.fetch_add(1, Ordering::Relaxed)
        );
        socket.monitor(&monitor_endpoint, MONITORED_EVENTS)
            .map_err(MonitoredSocketError::Monitor)?;
        let monitor = ctx.socket(zmq::PAIR)
            .map_err(MonitoredSocketError::SocketCreation)?;
        monitor.connect(&monitor_endpoint)
            .map_err(MonitoredSocketError::Monitor)?;

        options.apply(&socket)?;

        let connected = match options.role {
            SocketRole::Server => {
                socket.bind(endpoint)
                    .map_err(|e| MonitoredSocketError::Attach(endpoint.into(), e))?;
                false
            },
            SocketRole::Client { connect_timeout_ms } => {
                socket.connect(endpoint)
                    .map_err(|e| MonitoredSocketError::Attach(endpoint.into(), e))?;

                set_opt("monitor rcvtimeo", monitor.set_rcvtimeo(
                    connect_timeout_ms.max(0) + CONNECT_REPORT_MARGIN_MS
                ))?;

                match read_event(&monitor) {
                    Ok(SocketEvent::CONNECTED) => true,
                    Ok(e) => {
                        debug!("First connection to {} ended with {:?}", endpoint, e);
                        return Err(MonitoredSocketError::ServerUnreachable(endpoint.into()))
                    },
                    Err(zmq::Error::EAGAIN) =>
                        return Err(MonitoredSocketError::ServerUnreachable(endpoint.into())),
                    Err(e) => return Err(MonitoredSocketError::Monitor(e))
                }
            }
        };

        set_opt("monitor rcvtimeo", monitor.set_rcvtimeo(MONITOR_POLL_MS))?;

        let connected = Arc::new(AtomicBool::new(connected));
        let stop_monitor = Arc::new(AtomicBool::new(false));

        let handle = {
            let connected = connected.clone();
            let stop_monitor = stop_monitor.clone();
            thread::spawn(move || watch_link(monitor, connected, stop_monitor))
        };

        Ok(Self {
            socket,
            connected,
            stop_monitor,
            monitor: Some(handle)
        })
    }

    /// Returns `true` while a peer is attached to the socket.
    pub fn connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

impl Drop for MonitoredSocket {
    fn drop(&mut self) {
        self.stop_monitor.store(true, Ordering::Relaxed);

        if let Some(h) = self.monitor.take() {
            h.join().ok();
        }
    }
}

impl std::ops::Deref for MonitoredSocket {
    type Target = Socket;

    fn deref(&self) -> &Self::Target {
        &self.socket
    }
}

impl std::ops::DerefMut for MonitoredSocket {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.socket
    }
}

impl SocketOptions {
    /// Options for the robot (or simulation) server.
    pub fn server(recv_timeout_ms: i32, send_timeout_ms: i32) -> Self {
        Self {
            role: SocketRole::Server,
            recv_timeout_ms,
            send_timeout_ms
        }
    }

    /// Options for the follower. Both halves of a request share `request_timeout_ms`.
    pub fn client(connect_timeout_ms: i32, request_timeout_ms: i32) -> Self {
        Self {
            role: SocketRole::Client { connect_timeout_ms },
            recv_timeout_ms: request_timeout_ms,
            send_timeout_ms: request_timeout_ms
        }
    }

    fn apply(&self, socket: &Socket) -> Result<(), MonitoredSocketError> {
        set_opt("linger", socket.set_linger(LINGER_MS))?;
        set_opt("rcvtimeo", socket.set_rcvtimeo(self.recv_timeout_ms))?;
        set_opt("sndtimeo", socket.set_sndtimeo(self.send_timeout_ms))?;

        if let SocketRole::Client { connect_timeout_ms } = self.role {
            set_opt("connect_timeout", socket.set_connect_timeout(connect_timeout_ms))?;
            set_opt("heartbeat_ivl", socket.set_heartbeat_ivl(HEARTBEAT_IVL_MS))?;
            set_opt("heartbeat_timeout", socket.set_heartbeat_timeout(HEARTBEAT_TIMEOUT_MS))?;

            // After a timed out request the next one can still be sent, and a late reply to the
            // old one is dropped instead of being read as the answer to the new one.
            set_opt("req_relaxed", socket.set_req_relaxed(true))?;
            set_opt("req_correlate", socket.set_req_correlate(true))?;
        }

        Ok(())
    }
}

impl SocketRole {
    fn socket_type(&self) -> SocketType {
        match self {
            SocketRole::Server => zmq::REP,
            SocketRole::Client { .. } => zmq::REQ
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Events which change whether a peer is attached, or end a connection attempt.
const MONITORED_EVENTS: i32 = SocketEvent::CONNECTED as i32
    | SocketEvent::ACCEPTED as i32
    | SocketEvent::DISCONNECTED as i32
    | SocketEvent::CLOSED as i32
    | SocketEvent::CONNECT_RETRIED as i32;

fn set_opt(name: &'static str, result: zmq::Result<()>) -> Result<(), MonitoredSocketError> {
    result.map_err(|e| MonitoredSocketError::SocketOption(name, e))
}

/// Read one event from a monitor socket.
///
/// Events are two frames: the event number and value, then the peer's address.
fn read_event(monitor: &Socket) -> Result<SocketEvent, zmq::Error> {
    let msg = monitor.recv_msg(0)?;

    if msg.len() < 2 {
        return Err(zmq::Error::EPROTO)
    }
    let event = u16::from_ne_bytes([msg[0], msg[1]]);

    if monitor.get_rcvmore()? {
        monitor.recv_msg(0)?;
    }

    Ok(SocketEvent::from_raw(event))
}

/// Body of the monitor thread, keeps `connected` up to date until told to stop.
fn watch_link(monitor: Socket, connected: Arc<AtomicBool>, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::Relaxed) {
        match read_event(&monitor) {
            Ok(SocketEvent::CONNECTED) | Ok(SocketEvent::ACCEPTED) => {
                debug!("Robot link peer attached");
                connected.store(true, Ordering::Relaxed)
            },
            Ok(SocketEvent::DISCONNECTED) => {
                debug!("Robot link peer detached");
                connected.store(false, Ordering::Relaxed)
            },
            Ok(_) | Err(zmq::Error::EAGAIN) => (),
            Err(e) => {
                warn!("Robot link monitor stopped: {}", e);
                connected.store(false, Ordering::Relaxed);
                break
            }
        }
    }
}
