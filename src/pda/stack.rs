//! Tagged stack frames for the formatting validator, and bracket helpers.

/// Opening brackets, in the order their closers appear in `CLOSERS`.
pub const OPENERS: [u8; 4] = [b'(', b'[', b'{', b'<'];

pub const CLOSERS: [u8; 4] = [b')', b']', b'}', b'>'];

#[inline]
pub fn is_opener(b: u8) -> bool {
    OPENERS.contains(&b)
}

#[inline]
pub fn is_closer(b: u8) -> bool {
    CLOSERS.contains(&b)
}

/// The opener a closer pairs with.
#[inline]
pub fn opener_for(closer: u8) -> Option<u8> {
    CLOSERS
        .iter()
        .position(|&c| c == closer)
        .map(|i| OPENERS[i])
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Bottom,
    Bold,
    Italic,
    Strikethrough,
    /// Holds the opening bracket byte.
    Bracket(u8),
}

/// An open construct on the formatting stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    /// Byte offset where the construct was opened.
    pub position: usize,
    /// Stack height below this frame when it was pushed.
    pub depth: usize,
}

/// A frame stack that always keeps its bottom frame.
#[derive(Clone, Debug)]
pub struct FrameStack {
    frames: Vec<Frame>,
}

impl Default for FrameStack {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStack {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame {
                kind: FrameKind::Bottom,
                position: 0,
                depth: 0,
            }],
        }
    }

    pub fn push(&mut self, kind: FrameKind, position: usize) {
        let depth = self.frames.len();
        self.frames.push(Frame {
            kind,
            position,
            depth,
        });
    }

    /// The top frame; the bottom frame when nothing is open.
    pub fn top(&self) -> &Frame {
        // The bottom frame is never popped, so the stack is never empty.
        &self.frames[self.frames.len() - 1]
    }

    pub fn top_kind(&self) -> FrameKind {
        self.top().kind
    }

    /// Pop the top frame unless it is the bottom frame.
    pub fn pop(&mut self) -> Option<Frame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Number of open (non-bottom) frames.
    pub fn open(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn is_clear(&self) -> bool {
        self.open() == 0
    }
}
