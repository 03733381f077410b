//! UI-agnostic conversation state: the message list, the submit policy, and
//! the reducer that folds stream events back in. Testable without a terminal.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Identifies one request/reply exchange. Chunk routing is keyed on this,
/// never on a message list index: an index captured at submit time goes stale
/// the moment anything else touches the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(u64);

/// What `submit` hands back for the caller to put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub id: RequestId,
    pub message: String,
}

/// Stream deliveries routed back into the conversation.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    Chunk { request: RequestId, text: String },
    Done { request: RequestId },
    Failed { request: RequestId, error: String },
}

#[derive(Debug)]
struct InFlight {
    id: RequestId,
    slot: usize,
    buffer: String,
}

/// The message list plus the set of replies still streaming in.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    in_flight: Vec<InFlight>,
    next_request: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// True while any reply is still streaming.
    pub fn is_awaiting(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// True when `idx` is an in-flight placeholder with nothing streamed yet.
    pub fn is_pending_slot(&self, idx: usize) -> bool {
        self.in_flight
            .iter()
            .any(|reply| reply.slot == idx && reply.buffer.is_empty())
    }

    /// Submit policy plus bookkeeping. Returns `None` (a no-op) when the input
    /// trims to empty or a reply is already awaited; otherwise appends the
    /// user message and an empty assistant placeholder and returns the request
    /// to issue. Validation is on the trimmed text; the raw input is what gets
    /// stored and sent.
    pub fn submit(&mut self, input: &str) -> Option<SendRequest> {
        if input.trim().is_empty() || self.is_awaiting() {
            return None;
        }
        Some(self.begin_exchange(input))
    }

    /// Append the user message and its empty placeholder, registering the
    /// reply as in flight. Skips the submit policy; the reducer stays correct
    /// even with several exchanges in flight at once.
    pub fn begin_exchange(&mut self, message: &str) -> SendRequest {
        self.next_request += 1;
        let id = RequestId(self.next_request);

        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content: message.to_string(),
        });
        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: String::new(),
        });

        self.in_flight.push(InFlight {
            id,
            slot: self.messages.len() - 1,
            buffer: String::new(),
        });

        SendRequest {
            id,
            message: message.to_string(),
        }
    }

    /// Fold one stream event into the conversation. Events for a request that
    /// is no longer in flight are dropped.
    pub fn apply(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::Chunk { request, text } => {
                if let Some(reply) = self.in_flight.iter_mut().find(|r| r.id == request) {
                    reply.buffer.push_str(&text);
                    // Resync the placeholder from the accumulator
                    self.messages[reply.slot] = ChatMessage {
                        role: ChatRole::Assistant,
                        content: reply.buffer.clone(),
                    };
                }
            }
            ChatEvent::Done { request } => {
                self.in_flight.retain(|r| r.id != request);
            }
            ChatEvent::Failed { request, error } => {
                if let Some(idx) = self.in_flight.iter().position(|r| r.id == request) {
                    let reply = self.in_flight.remove(idx);
                    let content = if reply.buffer.is_empty() {
                        format!("Error: {}", error)
                    } else {
                        // Keep what already streamed in; mark the cutoff
                        format!("{}\nError: {}", reply.buffer, error)
                    };
                    self.messages[reply.slot] = ChatMessage {
                        role: ChatRole::Assistant,
                        content,
                    };
                }
            }
        }
    }
}
