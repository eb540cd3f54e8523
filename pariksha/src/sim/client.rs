//! TCP clients for the simulator bridge and the controller goal interface.
//!
//! Both speak request/response over length-prefixed protobuf frames (see
//! [`crate::sim::wire`]). Every socket carries read and write timeouts so no
//! call can block indefinitely.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::core::{Point2D, Pose2D};
use crate::error::{BenchError, Result};
use crate::sim::proto::{
    Empty, GoalMsg, NavRequest, NavResponse, PointStamped, PoseMsg, SimRequest, SimResponse,
    Twist, nav_request, nav_response, sim_request, sim_response,
};
use crate::sim::wire::{read_frame, write_frame};
use crate::sim::{GoalPose, NavigationController, PathStore, Simulation};

/// Delay between readiness probes while waiting for the controller
const READY_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Floor for a single readiness probe's socket timeout (zero is rejected by
/// the socket API)
const MIN_PROBE_TIMEOUT: Duration = Duration::from_millis(10);

fn resolve(addr: &str) -> Result<SocketAddr> {
    addr.to_socket_addrs()
        .map_err(|e| BenchError::Config(format!("Invalid address {}: {}", addr, e)))?
        .next()
        .ok_or_else(|| BenchError::Config(format!("Address {} did not resolve", addr)))
}

fn open_stream(addr: &SocketAddr, timeout: Duration) -> std::io::Result<TcpStream> {
    let stream = TcpStream::connect_timeout(addr, timeout)?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;
    stream.set_nodelay(true)?;
    Ok(stream)
}

/// Client for the simulator bridge.
///
/// Reference paths are not served by the bridge; they are read from the
/// scenario's path directory.
pub struct SimulationClient {
    stream: TcpStream,
    paths: PathStore,
}

impl SimulationClient {
    /// Connect with a per-call timeout.
    pub fn connect(addr: &str, timeout: Duration, paths: PathStore) -> Result<Self> {
        let sock_addr = resolve(addr)?;
        let stream = open_stream(&sock_addr, timeout).map_err(|e| {
            BenchError::SimulationUnavailable(format!("connect to {}: {}", sock_addr, e))
        })?;
        info!("Connected to simulator bridge at {}", sock_addr);
        Ok(Self { stream, paths })
    }

    fn call(&mut self, request: sim_request::Request) -> Result<sim_response::Response> {
        let msg = SimRequest {
            request: Some(request),
        };
        write_frame(&mut self.stream, &msg).map_err(unavailable)?;
        let reply: SimResponse = read_frame(&mut self.stream).map_err(unavailable)?;

        match reply.response {
            Some(sim_response::Response::Error(e)) => Err(BenchError::SimulationUnavailable(e)),
            Some(response) => Ok(response),
            None => Err(BenchError::Protocol("Empty simulator response".into())),
        }
    }

    fn call_ack(&mut self, request: sim_request::Request) -> Result<()> {
        match self.call(request)? {
            sim_response::Response::Ack(_) => Ok(()),
            other => Err(unexpected(&other)),
        }
    }
}

fn unavailable(e: BenchError) -> BenchError {
    match e {
        BenchError::Io(io) => BenchError::SimulationUnavailable(io.to_string()),
        other => other,
    }
}

fn unexpected(response: &sim_response::Response) -> BenchError {
    BenchError::Protocol(format!("Unexpected simulator response: {:?}", response))
}

impl Simulation for SimulationClient {
    fn pose(&mut self) -> Result<Pose2D> {
        match self.call(sim_request::Request::GetPose(Empty {}))? {
            sim_response::Response::Pose(p) => Ok(Pose2D::new(p.x, p.y, p.theta)),
            other => Err(unexpected(&other)),
        }
    }

    fn collision(&mut self) -> Result<bool> {
        match self.call(sim_request::Request::GetCollision(Empty {}))? {
            sim_response::Response::Collision(c) => Ok(c),
            other => Err(unexpected(&other)),
        }
    }

    fn sim_time(&mut self) -> Result<f64> {
        match self.call(sim_request::Request::GetTime(Empty {}))? {
            sim_response::Response::Time(t) => Ok(t),
            other => Err(unexpected(&other)),
        }
    }

    fn reset_to(&mut self, pose: Pose2D) -> Result<()> {
        self.call_ack(sim_request::Request::ResetTo(PoseMsg {
            x: pose.x,
            y: pose.y,
            theta: pose.theta,
        }))
    }

    fn publish_goal_point(&mut self, frame_id: &str, point: Point2D) -> Result<()> {
        self.call_ack(sim_request::Request::PublishGoalPoint(PointStamped {
            frame_id: frame_id.to_string(),
            x: point.x,
            y: point.y,
            z: 0.0,
        }))
    }

    fn publish_velocity(&mut self, linear: f64, angular: f64) -> Result<()> {
        self.call_ack(sim_request::Request::PublishVelocity(Twist { linear, angular }))
    }

    fn reference_path(&mut self, scenario: u32) -> Result<Vec<Point2D>> {
        self.paths.load(scenario)
    }
}

/// Client for the controller's goal-acceptance interface.
///
/// Connection is lazy: [`NavigationController::wait_for_server`] keeps
/// probing until the controller is up and reports ready.
pub struct ControllerClient {
    addr: SocketAddr,
    io_timeout: Duration,
    stream: Option<TcpStream>,
}

impl ControllerClient {
    pub fn new(addr: &str, io_timeout: Duration) -> Result<Self> {
        Ok(Self {
            addr: resolve(addr)?,
            io_timeout,
            stream: None,
        })
    }

    /// One exchange with every socket operation bounded by `timeout`.
    fn call(
        &mut self,
        request: nav_request::Request,
        timeout: Duration,
    ) -> Result<nav_response::Response> {
        let mut stream = match self.stream.take() {
            Some(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))?;
                stream
            }
            None => open_stream(&self.addr, timeout)?,
        };

        let msg = NavRequest {
            request: Some(request),
        };
        write_frame(&mut stream, &msg)?;
        let reply: NavResponse = read_frame(&mut stream)?;
        // Only a stream that completed an exchange is reused
        self.stream = Some(stream);

        reply
            .response
            .ok_or_else(|| BenchError::Protocol("Empty controller response".into()))
    }

    fn probe(&mut self, timeout: Duration) -> Result<bool> {
        match self.call(nav_request::Request::Status(Empty {}), timeout)? {
            nav_response::Response::Status(status) => Ok(status.ready),
            nav_response::Response::Error(e) => Err(BenchError::ControllerUnavailable(e)),
            other => Err(BenchError::Protocol(format!(
                "Unexpected controller response: {:?}",
                other
            ))),
        }
    }
}

impl NavigationController for ControllerClient {
    fn wait_for_server(&mut self, timeout: Duration) -> Result<bool> {
        let start = Instant::now();
        loop {
            let remaining = timeout.saturating_sub(start.elapsed());
            let probe_timeout =
                remaining.clamp(MIN_PROBE_TIMEOUT, self.io_timeout.max(MIN_PROBE_TIMEOUT));
            match self.probe(probe_timeout) {
                Ok(true) => {
                    info!("Controller at {} ready", self.addr);
                    return Ok(true);
                }
                Ok(false) => debug!("Controller at {} not ready yet", self.addr),
                Err(BenchError::Io(e)) => debug!("Controller at {} unreachable: {}", self.addr, e),
                Err(e) => return Err(e),
            }

            if start.elapsed() + READY_RETRY_INTERVAL > timeout {
                warn!(
                    "Controller at {} not ready after {:?}",
                    self.addr,
                    start.elapsed()
                );
                return Ok(false);
            }
            std::thread::sleep(READY_RETRY_INTERVAL);
        }
    }

    fn send_goal(&mut self, goal: &GoalPose) -> Result<()> {
        let msg = GoalMsg {
            target: Some(PointStamped {
                frame_id: goal.frame_id.clone(),
                x: goal.position.x,
                y: goal.position.y,
                z: 0.0,
            }),
            orientation: goal.orientation.to_vec(),
        };

        let response = self
            .call(nav_request::Request::SendGoal(msg), self.io_timeout)
            .map_err(|e| match e {
                BenchError::Io(io) => BenchError::ControllerUnavailable(io.to_string()),
                other => other,
            })?;

        match response {
            nav_response::Response::Ack(_) => Ok(()),
            nav_response::Response::Error(e) => Err(BenchError::ControllerUnavailable(e)),
            other => Err(BenchError::Protocol(format!(
                "Unexpected controller response: {:?}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::proto::ServerStatus;
    use std::net::TcpListener;
    use std::thread;

    /// Serve `count` simulator requests on a loopback socket.
    fn spawn_sim_server(
        count: usize,
        handler: impl Fn(sim_request::Request) -> sim_response::Response + Send + 'static,
    ) -> (String, thread::JoinHandle<Vec<sim_request::Request>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut seen = Vec::new();
            for _ in 0..count {
                let req: SimRequest = read_frame(&mut stream).unwrap();
                let req = req.request.unwrap();
                let reply = SimResponse {
                    response: Some(handler(req.clone())),
                };
                seen.push(req);
                write_frame(&mut stream, &reply).unwrap();
            }
            seen
        });
        (addr, handle)
    }

    #[test]
    fn test_simulation_queries() {
        let (addr, server) = spawn_sim_server(4, |req| match req {
            sim_request::Request::GetPose(_) => sim_response::Response::Pose(PoseMsg {
                x: -2.0,
                y: 3.0,
                theta: 1.57,
            }),
            sim_request::Request::GetCollision(_) => sim_response::Response::Collision(true),
            sim_request::Request::GetTime(_) => sim_response::Response::Time(12.5),
            _ => sim_response::Response::Ack(Empty {}),
        });

        let mut client =
            SimulationClient::connect(&addr, Duration::from_secs(2), PathStore::new(".")).unwrap();
        assert_eq!(client.pose().unwrap(), Pose2D::new(-2.0, 3.0, 1.57));
        assert!(client.collision().unwrap());
        assert_eq!(client.sim_time().unwrap(), 12.5);
        client.reset_to(Pose2D::new(-2.0, 3.0, 1.57)).unwrap();

        let seen = server.join().unwrap();
        assert!(matches!(
            seen[3],
            sim_request::Request::ResetTo(PoseMsg { x, y, .. }) if x == -2.0 && y == 3.0
        ));
    }

    #[test]
    fn test_bridge_error_is_unavailable() {
        let (addr, server) = spawn_sim_server(1, |_| {
            sim_response::Response::Error("model not spawned".into())
        });
        let mut client =
            SimulationClient::connect(&addr, Duration::from_secs(2), PathStore::new(".")).unwrap();
        assert!(matches!(
            client.pose(),
            Err(BenchError::SimulationUnavailable(_))
        ));
        server.join().unwrap();
    }

    #[test]
    fn test_mismatched_response_is_protocol_error() {
        let (addr, server) = spawn_sim_server(1, |_| sim_response::Response::Time(1.0));
        let mut client =
            SimulationClient::connect(&addr, Duration::from_secs(2), PathStore::new(".")).unwrap();
        assert!(matches!(client.collision(), Err(BenchError::Protocol(_))));
        server.join().unwrap();
    }

    #[test]
    fn test_connect_refused_is_unavailable() {
        // Bind then drop to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let result = SimulationClient::connect(
            &format!("127.0.0.1:{}", port),
            Duration::from_millis(200),
            PathStore::new("."),
        );
        assert!(matches!(result, Err(BenchError::SimulationUnavailable(_))));
    }

    #[test]
    fn test_controller_handshake_and_goal() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut goals = Vec::new();
            let mut probes = 0;
            loop {
                let req: NavRequest = match read_frame(&mut stream) {
                    Ok(req) => req,
                    Err(_) => break,
                };
                let response = match req.request.unwrap() {
                    nav_request::Request::Status(_) => {
                        probes += 1;
                        // Not ready on the first probe
                        nav_response::Response::Status(ServerStatus { ready: probes > 1 })
                    }
                    nav_request::Request::SendGoal(goal) => {
                        goals.push(goal);
                        nav_response::Response::Ack(Empty {})
                    }
                };
                write_frame(
                    &mut stream,
                    &NavResponse {
                        response: Some(response),
                    },
                )
                .unwrap();
            }
            (probes, goals)
        });

        let mut client = ControllerClient::new(&addr, Duration::from_secs(2)).unwrap();
        assert!(client.wait_for_server(Duration::from_secs(5)).unwrap());
        client
            .send_goal(&GoalPose::new("odom", Point2D::new(0.0, 10.0)))
            .unwrap();
        drop(client);

        let (probes, goals) = server.join().unwrap();
        assert_eq!(probes, 2);
        assert_eq!(goals.len(), 1);
        let target = goals[0].target.as_ref().unwrap();
        assert_eq!(target.frame_id, "odom");
        assert_eq!((target.x, target.y), (0.0, 10.0));
        assert_eq!(goals[0].orientation, vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_silent_controller_respects_ready_timeout() {
        // Accepts connections (via the backlog) but never answers
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let mut client = ControllerClient::new(&addr, Duration::from_secs(5)).unwrap();
        let start = Instant::now();
        assert!(!client.wait_for_server(Duration::from_millis(300)).unwrap());
        assert!(
            start.elapsed() < Duration::from_secs(2),
            "waited {:?}",
            start.elapsed()
        );
        drop(listener);
    }

    #[test]
    fn test_controller_never_up_times_out() {
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let mut client =
            ControllerClient::new(&format!("127.0.0.1:{}", port), Duration::from_millis(100))
                .unwrap();
        assert!(!client.wait_for_server(Duration::from_millis(300)).unwrap());
    }
}
