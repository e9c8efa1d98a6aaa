//! The event loop: sole owner of application state, renderer and screen.

use core_actions::{PromptPurpose, complete_prompt, dispatch, translate};
use core_events::{Event, InputEvent, Key};
use core_render::{PromptStep, Renderer};
use core_state::AppState;
use core_terminal::{Screen, TerminalError, TerminalResult, Viewport};
use std::io::{self, Write};
use tokio::sync::mpsc::Receiver;
use tracing::{debug, info, trace};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("input failed: {0}")]
    Input(String),
    #[error(transparent)]
    Terminal(#[from] TerminalError),
    #[error("couldn't write to terminal: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    ChannelClosed,
}

impl ShutdownReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ShutdownReason::Interrupt => "interrupt",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopControl {
    Continue { redraw: bool },
    Break(ShutdownReason),
}

impl LoopControl {
    fn redraw() -> Self {
        LoopControl::Continue { redraw: true }
    }

    fn idle() -> Self {
        LoopControl::Continue { redraw: false }
    }
}

pub struct PomoRuntime<W: Write, P> {
    state: AppState,
    renderer: Renderer,
    screen: Screen<W>,
    rx: Receiver<Event>,
    /// Re-queries the terminal size on resize.
    query_size: P,
    pending_prompt: Option<PromptPurpose>,
}

impl<W, P> PomoRuntime<W, P>
where
    W: Write,
    P: FnMut() -> TerminalResult<Viewport>,
{
    pub fn new(state: AppState, renderer: Renderer, screen: Screen<W>, rx: Receiver<Event>, query_size: P) -> Self {
        Self {
            state,
            renderer,
            screen,
            rx,
            query_size,
            pending_prompt: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn screen(&self) -> &Screen<W> {
        &self.screen
    }

    /// Draw the first frame, then consume events until interrupted or every
    /// sender is gone. Fatal errors end the loop with `Err`.
    pub async fn run(&mut self) -> Result<ShutdownReason, RuntimeError> {
        self.renderer.redraw(&self.state, &mut self.screen)?;

        let span = tracing::debug_span!(target: "runtime", "event_loop");
        let _enter = span.enter();

        while let Some(event) = self.rx.recv().await {
            match self.handle_event(event)? {
                LoopControl::Break(reason) => {
                    info!(target: "runtime", reason = reason.as_str(), "event_loop_exit");
                    return Ok(reason);
                }
                LoopControl::Continue { redraw: true } => {
                    self.renderer.redraw(&self.state, &mut self.screen)?;
                }
                LoopControl::Continue { redraw: false } => {}
            }
        }
        info!(target: "runtime", reason = ShutdownReason::ChannelClosed.as_str(), "event_loop_exit");
        Ok(ShutdownReason::ChannelClosed)
    }

    fn handle_event(&mut self, event: Event) -> Result<LoopControl, RuntimeError> {
        match event {
            Event::Tick => Ok(if self.state.tick() {
                LoopControl::redraw()
            } else {
                LoopControl::idle()
            }),
            Event::Resize => {
                let viewport = (self.query_size)()?;
                debug!(target: "runtime", rows = viewport.rows, cols = viewport.cols, "resize");
                self.renderer.resize(viewport);
                Ok(LoopControl::redraw())
            }
            Event::Interrupt | Event::Input(InputEvent::Key(Key::Interrupt)) => {
                Ok(LoopControl::Break(ShutdownReason::Interrupt))
            }
            Event::Input(InputEvent::Key(key)) => self.handle_key(key),
            Event::Input(InputEvent::Failed(reason)) => Err(RuntimeError::Input(reason)),
        }
    }

    fn handle_key(&mut self, key: Key) -> Result<LoopControl, RuntimeError> {
        // An open prompt owns every key until Enter.
        if let Some(prompt) = self.renderer.prompt_mut() {
            return match prompt.apply(key) {
                PromptStep::Continue => {
                    prompt.redraw(&mut self.screen)?;
                    Ok(LoopControl::idle())
                }
                PromptStep::Submit(text) => {
                    self.renderer.end_prompt();
                    if let Some(purpose) = self.pending_prompt.take() {
                        complete_prompt(purpose, &text, &mut self.state);
                    }
                    Ok(LoopControl::redraw())
                }
                PromptStep::Interrupted => Ok(LoopControl::Break(ShutdownReason::Interrupt)),
            };
        }

        let Some(action) = translate(self.state.mode(), key, !self.state.tasks().is_empty()) else {
            trace!(target: "runtime", mode = ?self.state.mode(), "key_unbound");
            return Ok(LoopControl::idle());
        };
        let result = dispatch(action, &mut self.state);
        if let Some(request) = result.prompt {
            self.renderer.begin_prompt(request.label, &request.initial);
            self.pending_prompt = Some(request.purpose);
        }
        Ok(LoopControl::Continue {
            redraw: result.dirty,
        })
    }
}
