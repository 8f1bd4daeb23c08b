use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use canvas::input::{Point, Tool};
use canvas::observer::Change;
use canvas::session::Session;
use canvas::sync::ChannelTransport;
use clap::{Args, Parser, Subcommand, ValueEnum};
use frames::{Event, Frame, decode_frame, encode_frame};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("frame codec failed: {0}")]
    Codec(#[from] frames::CodecError),
    #[error("timed out waiting for websocket frame")]
    Timeout,
    #[error("server never assigned an identity")]
    MissingIdentity,
    #[error("invalid point {0:?}; expected X,Y")]
    InvalidPoint(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for CliError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WsConnect(Box::new(error))
    }
}

#[derive(Parser, Debug)]
#[command(name = "canvas-cli", about = "Headless client for the shared drawing canvas")]
struct Cli {
    #[arg(long, env = "CANVAS_URL", default_value = "ws://127.0.0.1:3000/ws")]
    url: String,

    /// Rename this connection before running the command.
    #[arg(long, env = "CANVAS_NAME")]
    name: Option<String>,

    /// Seconds to wait for each expected frame.
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print presence and element counts as they change.
    Watch,
    /// Draw one element with a synthetic gesture.
    Draw(DrawArgs),
    /// Clear the canvas for everyone.
    Clear,
    /// Change this connection's display name.
    Rename { name: String },
}

#[derive(Args, Debug)]
struct DrawArgs {
    #[arg(value_enum)]
    tool: ToolArg,

    #[arg(long, value_parser = parse_point)]
    from: Point,

    #[arg(long, value_parser = parse_point)]
    to: Point,

    /// Pointer moves between `from` and `to`.
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..))]
    steps: u32,

    #[arg(long)]
    color: Option<String>,

    #[arg(long)]
    width: Option<f64>,

    #[arg(long)]
    fill: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ToolArg {
    Pen,
    Eraser,
    Rect,
    Circle,
}

impl From<ToolArg> for Tool {
    fn from(value: ToolArg) -> Self {
        match value {
            ToolArg::Pen => Self::Pen,
            ToolArg::Eraser => Self::Eraser,
            ToolArg::Rect => Self::Rect,
            ToolArg::Circle => Self::Circle,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "cli=info,canvas=info".into()))
        .init();

    let cli = Cli::parse();
    let mut conn = Connection::open(&cli.url, Duration::from_secs(cli.timeout_secs)).await?;
    conn.wait_for_greeting().await?;
    if let Some(name) = &cli.name {
        conn.rename(name).await?;
    }

    let result = match cli.command {
        Command::Watch => run_watch(&mut conn).await,
        Command::Draw(args) => run_draw(&mut conn, args).await,
        Command::Clear => run_clear(&mut conn).await,
        Command::Rename { name } => conn.rename(&name).await,
    };
    conn.close().await;
    result
}

// =============================================================================
// COMMANDS
// =============================================================================

async fn run_watch(conn: &mut Connection) -> Result<(), CliError> {
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    conn.session.subscribe(move |change| sink.borrow_mut().push(change));
    println!("{}", summary(&conn.session));

    loop {
        tokio::select! {
            frame = conn.recv() => {
                conn.apply(&frame?);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("watch: interrupted");
                return Ok(());
            }
        }
        let drained: Vec<Change> = changes.borrow_mut().drain(..).collect();
        if !drained.is_empty() {
            println!("{}", summary(&conn.session));
        }
    }
}

async fn run_draw(conn: &mut Connection, args: DrawArgs) -> Result<(), CliError> {
    let session = &mut conn.session;
    session.set_tool(args.tool.into());
    if let Some(color) = args.color {
        session.set_stroke_color(color);
    }
    if let Some(width) = args.width {
        session.set_stroke_width(width);
    }
    if let Some(fill) = args.fill {
        session.set_fill_color(fill);
    }
    debug!(settings = ?session.settings(), "draw: tool settings");

    session.pointer_down(args.from);
    for pt in interpolate(args.from, args.to, args.steps) {
        session.pointer_move(pt);
    }
    let id = session.gesture().active_id().map(ToString::to_string);
    session.pointer_up();
    conn.flush().await?;

    if let Some(id) = id {
        println!("{id}");
    }
    Ok(())
}

async fn run_clear(conn: &mut Connection) -> Result<(), CliError> {
    conn.session.clear_canvas();
    conn.flush().await?;
    println!("cleared");
    Ok(())
}

// =============================================================================
// CONNECTION
// =============================================================================

/// A session wired to a live relay socket.
struct Connection {
    stream: WsStream,
    session: Session<ChannelTransport>,
    outbound: UnboundedReceiver<Frame>,
    timeout: Duration,
}

impl Connection {
    async fn open(url: &str, timeout: Duration) -> Result<Self, CliError> {
        let (stream, _) = connect_async(url).await?;
        let (transport, outbound) = ChannelTransport::pair();
        let mut session = Session::new(transport);
        session.init();
        info!(%url, "connected");
        Ok(Self { stream, session, outbound, timeout })
    }

    /// Apply frames until the history arrives; the server sends identity
    /// and roster before it.
    async fn wait_for_greeting(&mut self) -> Result<(), CliError> {
        self.wait_for(|frame| frame.is(Event::LoadDrawing)).await?;
        if self.session.identity().is_none() {
            return Err(CliError::MissingIdentity);
        }
        Ok(())
    }

    async fn rename(&mut self, name: &str) -> Result<(), CliError> {
        let Some(me) = self.session.identity().map(|u| u.id.clone()) else {
            return Err(CliError::MissingIdentity);
        };
        self.session.rename(name);
        self.flush().await?;
        let updated =
            self.wait_for(|frame| frame.is(Event::UserUpdated) && frame.data["id"].as_str() == Some(me.as_str())).await?;
        println!("{}", updated.data["username"].as_str().unwrap_or_default());
        Ok(())
    }

    /// Receive and apply frames until one matches `pred`. Returns it.
    async fn wait_for(&mut self, pred: impl Fn(&Frame) -> bool) -> Result<Frame, CliError> {
        loop {
            let frame = tokio::time::timeout(self.timeout, self.recv()).await.map_err(|_| CliError::Timeout)??;
            self.apply(&frame);
            if pred(&frame) {
                return Ok(frame);
            }
        }
    }

    fn apply(&mut self, frame: &Frame) {
        debug!(event = %frame.event, "recv frame");
        self.session.handle_frame(frame);
    }

    async fn recv(&mut self) -> Result<Frame, CliError> {
        loop {
            let Some(message) = self.stream.next().await else {
                return Err(CliError::WsClosed);
            };
            match message? {
                Message::Text(text) => return Ok(decode_frame(text.as_str())?),
                Message::Close(_) => return Err(CliError::WsClosed),
                _ => {}
            }
        }
    }

    /// Write every frame the session queued to the socket.
    async fn flush(&mut self) -> Result<(), CliError> {
        while let Ok(frame) = self.outbound.try_recv() {
            let text = encode_frame(&frame)?;
            self.stream.send(Message::text(text)).await?;
        }
        Ok(())
    }

    async fn close(mut self) {
        self.session.teardown();
        if let Err(e) = self.stream.close(None).await {
            debug!(error = %e, "close failed");
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn parse_point(raw: &str) -> Result<Point, CliError> {
    let invalid = || CliError::InvalidPoint(raw.to_owned());
    let (x, y) = raw.split_once(',').ok_or_else(invalid)?;
    let x: f64 = x.trim().parse().map_err(|_| invalid())?;
    let y: f64 = y.trim().parse().map_err(|_| invalid())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(invalid());
    }
    Ok(Point::new(x, y))
}

/// `steps` evenly spaced points after `from`, ending exactly at `to`.
fn interpolate(from: Point, to: Point, steps: u32) -> Vec<Point> {
    (1..=steps)
        .map(|i| {
            let t = f64::from(i) / f64::from(steps);
            Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t)
        })
        .collect()
}

fn summary(session: &Session<ChannelTransport>) -> String {
    let me = session.identity().map_or("?", |u| u.username.as_str());
    let users: Vec<&str> = session.roster().sorted().iter().map(|u| u.username.as_str()).collect();
    format!("me={me} users=[{}] elements={}", users.join(", "), session.elements().len())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
