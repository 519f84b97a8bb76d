use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::modules::cube::Pose;
use crate::modules::directive::Directive;
use crate::modules::search::CONTROLLED;
use crate::modules::sim::{AGENTS, Cell, NO_MOVE, ProgressError, Simulation, owner_of};
use crate::modules::snapshot::{GameSnapshot, MoveStatus, StartResponse, StartStatus, encode};

/// Public game server used when nothing else is configured.
pub const DEFAULT_GAME_SERVER: &str = "https://gbc2023.tenka1.klab.jp";
/// Attempts per request before giving up.
pub const MAX_ATTEMPTS: usize = 5;
/// Pause between attempts after a 5xx or transport failure.
pub const RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} answered {status}")]
    Status { url: String, status: StatusCode },
    #[error("{url} failed after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: usize },
    #[error("practice match refused to start: {0:?}")]
    StartRefused(StartResponse),
    #[error("no snapshot received yet; submit a move first")]
    NoSnapshot,
    #[error("move rejected: {0}")]
    Rejected(#[from] ProgressError),
    #[error("directive {0} is off the board")]
    OffBoard(Directive),
}

fn move_code(directive: &Directive) -> Result<i32, ServerError> {
    directive
        .move_code()
        .ok_or(ServerError::OffBoard(*directive))
}

/// The two calls the bot needs from a game server.
pub trait GameServer {
    /// Send this turn's directives for the two controllable agents.
    fn submit_move(&mut self, dir0: &Directive, dir5: &Directive)
    -> Result<MoveStatus, ServerError>;

    /// Latest board the server reported.
    fn fetch_state(&self) -> Result<GameSnapshot, ServerError>;
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: String,
    pub token: String,
    /// Join this match; a practice match is started when absent.
    pub game_id: Option<i32>,
    pub practice_mode: i32,
    pub practice_delay: i32,
    pub timeout: Duration,
}

/// Game server reached over its HTTP API.
#[derive(Debug)]
pub struct HttpGameServer {
    base_url: String,
    token: String,
    game_id: i32,
    http: Client,
    last: Option<GameSnapshot>,
}

impl HttpGameServer {
    pub fn connect(config: HttpConfig) -> Result<Self, ServerError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        let mut server = Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
            game_id: 0,
            http,
            last: None,
        };

        server.game_id = match config.game_id {
            Some(id) => id,
            None => {
                let started = server.start_practice(config.practice_mode, config.practice_delay)?;
                match started.status {
                    StartStatus::Ok | StartStatus::Started => started.game_id,
                    StartStatus::Unknown => return Err(ServerError::StartRefused(started)),
                }
            }
        };
        debug!(game_id = server.game_id, "joined game");
        Ok(server)
    }

    pub fn game_id(&self) -> i32 {
        self.game_id
    }

    /// Ask the server for a practice match.
    pub fn start_practice(&self, mode: i32, delay: i32) -> Result<StartResponse, ServerError> {
        self.get_json(&format!("/api/start/{}/{}/{}", self.token, mode, delay))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServerError> {
        Ok(self.call_api(path)?.json()?)
    }

    /// GET `path`, retrying on server errors and transport failures.
    fn call_api(&self, path: &str) -> Result<Response, ServerError> {
        let url = format!("{}{}", self.base_url, path);
        for attempt in 1..=MAX_ATTEMPTS {
            debug!(%url, attempt, "calling game server");
            match self.http.get(&url).send() {
                Ok(response) if response.status() == StatusCode::OK => return Ok(response),
                Ok(response) if response.status().is_server_error() => {
                    warn!(%url, status = %response.status(), attempt, "server error; retrying");
                }
                Ok(response) => {
                    return Err(ServerError::Status {
                        url,
                        status: response.status(),
                    });
                }
                Err(err) => {
                    warn!(%url, error = %err, attempt, "request failed; retrying");
                }
            }
            thread::sleep(RETRY_DELAY);
        }
        Err(ServerError::RetriesExhausted {
            url,
            attempts: MAX_ATTEMPTS,
        })
    }
}

impl GameServer for HttpGameServer {
    fn submit_move(
        &mut self,
        dir0: &Directive,
        dir5: &Directive,
    ) -> Result<MoveStatus, ServerError> {
        move_code(dir0)?;
        move_code(dir5)?;
        let reply: GameSnapshot = self.get_json(&format!(
            "/api/move/{}/{}/{}/{}",
            self.token, self.game_id, dir0, dir5
        ))?;
        let status = reply.status;
        if status == MoveStatus::Ok {
            self.last = Some(reply);
        }
        Ok(status)
    }

    fn fetch_state(&self) -> Result<GameSnapshot, ServerError> {
        self.last.clone().ok_or(ServerError::NoSnapshot)
    }
}

/// Standard opening: agent `i` in the centre of face `i`, its cell already
/// painted by its player.
pub fn opening(charges: i32) -> Simulation {
    let mut agents = [Pose::new(0, 0, 0, 0); AGENTS];
    for (agent, pose) in agents.iter_mut().enumerate() {
        *pose = Pose::new(agent as i32, 2, 2, 0);
    }
    let mut sim = Simulation::new(agents, [charges; AGENTS]);
    for agent in 0..AGENTS {
        sim.set_cell(agents[agent].cell(), Cell::painted(owner_of(agent)));
    }
    sim
}

/// In-process server running the simulation core. Opponents never move.
#[derive(Debug, Clone)]
pub struct LocalGameServer {
    sim: Simulation,
    clock: i64,
}

impl LocalGameServer {
    pub fn new(sim: Simulation) -> Self {
        Self { sim, clock: 0 }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }
}

impl GameServer for LocalGameServer {
    fn submit_move(
        &mut self,
        dir0: &Directive,
        dir5: &Directive,
    ) -> Result<MoveStatus, ServerError> {
        if self.sim.is_finished() {
            return Ok(MoveStatus::GameFinished);
        }
        let mut moves = [NO_MOVE; AGENTS];
        moves[CONTROLLED[0]] = move_code(dir0)?;
        moves[CONTROLLED[1]] = move_code(dir5)?;
        self.sim.progress(&moves)?;
        self.clock += 1;
        Ok(MoveStatus::Ok)
    }

    fn fetch_state(&self) -> Result<GameSnapshot, ServerError> {
        Ok(encode(&self.sim, MoveStatus::Ok, self.clock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread::JoinHandle;

    use crate::modules::sim::TOTAL_TURN;
    use crate::modules::snapshot::decode;

    #[test]
    fn opening_paints_one_cell_per_agent() {
        let sim = opening(2);
        assert_eq!(sim.area(0), 2);
        assert_eq!(sim.area(1), 2);
        assert_eq!(sim.area(2), 2);
        assert_eq!(sim.agent(5), Pose::new(5, 2, 2, 0));
        assert_eq!(sim.special(3), 2);
    }

    #[test]
    fn local_server_applies_one_tick_per_submission() {
        let mut server = LocalGameServer::new(opening(0));

        let status = server
            .submit_move(&Directive::Step(0), &Directive::Step(1))
            .unwrap();

        assert_eq!(status, MoveStatus::Ok);
        let snapshot = server.fetch_state().unwrap();
        assert_eq!(snapshot.turn, 1);
        assert_eq!(snapshot.moves, [0, -1, -1, -1, -1, 1]);
        let sim = decode(&snapshot).unwrap();
        assert_eq!(sim.area(0), 4);
        assert_eq!(sim, *server.simulation());
    }

    #[test]
    fn local_server_rejects_specials_without_charges() {
        let mut server = LocalGameServer::new(opening(0));

        let err = server
            .submit_move(&Directive::Dash(0), &Directive::Step(0))
            .unwrap_err();

        assert!(matches!(
            err,
            ServerError::Rejected(ProgressError::NoSpecialCharges { agent: 0, .. })
        ));
        assert_eq!(server.simulation().turn(), 0);
    }

    #[test]
    fn local_server_reports_the_end_of_the_match() {
        let mut sim = opening(0);
        sim.set_turn(TOTAL_TURN - 1);
        let mut server = LocalGameServer::new(sim);

        let last = server
            .submit_move(&Directive::Step(0), &Directive::Step(0))
            .unwrap();
        let after = server
            .submit_move(&Directive::Step(0), &Directive::Step(0))
            .unwrap();

        assert_eq!(last, MoveStatus::Ok);
        assert_eq!(after, MoveStatus::GameFinished);
        assert_eq!(server.simulation().turn(), TOTAL_TURN);
    }

    #[test]
    fn local_server_rejects_off_board_directives() {
        let mut server = LocalGameServer::new(opening(2));
        let before = server.simulation().clone();

        let wide = Directive::Teleport {
            face: 0,
            row: 0,
            col: 5,
        };
        let err = server.submit_move(&wide, &Directive::Step(0)).unwrap_err();
        assert!(matches!(err, ServerError::OffBoard(d) if d == wide));

        let err = server
            .submit_move(&Directive::Step(0), &Directive::Step(5))
            .unwrap_err();
        assert!(matches!(err, ServerError::OffBoard(Directive::Step(5))));

        assert_eq!(*server.simulation(), before);
        assert_eq!(server.simulation().special(0), 2);
    }

    fn http_server(base_url: String) -> HttpGameServer {
        HttpGameServer {
            base_url,
            token: "t".into(),
            game_id: 1,
            http: Client::builder()
                .no_proxy()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap(),
            last: None,
        }
    }

    /// Loopback server answering one connection per scripted reply, then
    /// closing its socket.
    fn scripted_http(replies: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let handle = thread::spawn(move || {
            for (status, body) in replies {
                let (mut stream, _) = listener.accept().unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                counter.fetch_add(1, Ordering::SeqCst);
                let reply = format!(
                    "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                stream.write_all(reply.as_bytes()).unwrap();
            }
        });
        (url, hits, handle)
    }

    const STARTED: &str = r#"{"status":"started","game_id":7,"start":0}"#;

    #[test]
    fn server_errors_are_retried_until_success() {
        let (url, hits, handle) = scripted_http(vec![(500, ""), (200, STARTED)]);
        let server = http_server(url);

        let started = server.start_practice(0, 0).unwrap();
        handle.join().unwrap();

        assert_eq!(started.status, StartStatus::Started);
        assert_eq!(started.game_id, 7);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn persistent_server_errors_exhaust_the_attempts() {
        let (url, hits, handle) = scripted_http(vec![(503, ""); MAX_ATTEMPTS]);
        let server = http_server(url);

        let err = server.start_practice(0, 0).unwrap_err();
        handle.join().unwrap();

        assert!(matches!(
            err,
            ServerError::RetriesExhausted {
                attempts: MAX_ATTEMPTS,
                ..
            }
        ));
        assert_eq!(hits.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[test]
    fn client_errors_fail_on_the_first_answer() {
        let (url, hits, handle) = scripted_http(vec![(404, "")]);
        let server = http_server(url);

        let err = server.start_practice(0, 0).unwrap_err();
        handle.join().unwrap();

        assert!(matches!(
            err,
            ServerError::Status { status, .. } if status == StatusCode::NOT_FOUND
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn http_server_checks_directives_before_sending() {
        // Nothing listens on the discard port; validation fails first.
        let mut server = http_server("http://127.0.0.1:9".into());

        let err = server
            .submit_move(&Directive::Dash(7), &Directive::Step(0))
            .unwrap_err();

        assert!(matches!(err, ServerError::OffBoard(Directive::Dash(7))));
    }

    #[test]
    fn http_server_has_no_state_before_the_first_move() {
        let server = http_server(DEFAULT_GAME_SERVER.to_string());
        assert!(matches!(server.fetch_state(), Err(ServerError::NoSnapshot)));
    }
}
