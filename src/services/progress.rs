//! 进度显示 - 业务能力层
//!
//! 独立的 tokio 任务负责画 spinner，引擎只通过 channel 发送命令，
//! 两边不共享任何状态。`stop()` 会等到 spinner 行被清除后才返回，
//! 之后引擎再输出本批结果。

use std::io::{IsTerminal, Write};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_INTERVAL: Duration = Duration::from_millis(120);
const DIM: &str = "\x1b[2;37m";
const RESET: &str = "\x1b[0m";
const CLEAR_LINE: &str = "\r\x1b[2K";

/// 发给进度任务的命令
#[derive(Debug)]
pub enum ProgressCommand {
    /// 开始显示
    Start { header: String, lines: Vec<String> },
    /// 停止并清除，清除完成后回复 ack
    Stop { ack: oneshot::Sender<()> },
}

/// 进度显示句柄
pub struct ProgressReporter {
    tx: Option<mpsc::UnboundedSender<ProgressCommand>>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    /// stdout 是终端时启动进度任务，否则不显示
    pub fn for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::spawn(std::io::stdout())
        } else {
            Self::disabled()
        }
    }

    /// 在指定输出上启动进度任务
    pub fn spawn<W: Write + Send + 'static>(out: W) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(rx, out));
        Self {
            tx: Some(tx),
            handle: Some(handle),
        }
    }

    /// 不显示任何内容
    pub fn disabled() -> Self {
        Self {
            tx: None,
            handle: None,
        }
    }

    pub fn start(&self, header: impl Into<String>, lines: Vec<String>) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(ProgressCommand::Start {
                header: header.into(),
                lines,
            });
        }
    }

    /// 停止显示，等待清屏完成
    pub async fn stop(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (ack, done) = oneshot::channel();
        if tx.send(ProgressCommand::Stop { ack }).is_ok() {
            let _ = done.await;
        }
    }

    /// 关闭进度任务
    pub async fn shutdown(mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

struct Spinner {
    header: String,
    lines: Vec<String>,
    frame: usize,
    drawn: bool,
}

impl Spinner {
    fn rows(&self) -> usize {
        1 + self.lines.len()
    }

    fn draw(&mut self, out: &mut impl Write) {
        let frame = FRAMES[self.frame % FRAMES.len()];
        let mut block = format!("{DIM}{frame} {}{RESET}\n", self.header);
        for line in &self.lines {
            block.push_str(&format!("{DIM}  {line}{RESET}\n"));
        }
        block.push_str(&format!("\x1b[{}A", self.rows()));
        let _ = out.write_all(block.as_bytes());
        let _ = out.flush();
        self.frame += 1;
        self.drawn = true;
    }

    fn clear(&self, out: &mut impl Write) {
        if !self.drawn {
            return;
        }
        let rows = self.rows();
        let mut block = format!("{CLEAR_LINE}\n").repeat(rows);
        block.push_str(&format!("\x1b[{rows}A"));
        let _ = out.write_all(block.as_bytes());
        let _ = out.flush();
    }
}

async fn run<W: Write>(mut rx: mpsc::UnboundedReceiver<ProgressCommand>, mut out: W) {
    let mut active: Option<Spinner> = None;
    let mut ticker = tokio::time::interval(FRAME_INTERVAL);

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(ProgressCommand::Start { header, lines }) => {
                    if let Some(spinner) = active.take() {
                        spinner.clear(&mut out);
                    }
                    active = Some(Spinner { header, lines, frame: 0, drawn: false });
                    ticker.reset_immediately();
                }
                Some(ProgressCommand::Stop { ack }) => {
                    if let Some(spinner) = active.take() {
                        spinner.clear(&mut out);
                    }
                    let _ = ack.send(());
                }
                None => {
                    if let Some(spinner) = active.take() {
                        spinner.clear(&mut out);
                    }
                    break;
                }
            },
            _ = ticker.tick(), if active.is_some() => {
                if let Some(spinner) = active.as_mut() {
                    spinner.draw(&mut out);
                }
            }
        }
    }
}
