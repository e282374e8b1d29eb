//! Single-threaded actors backed by a dedicated OS thread.
//!
//! Each actor owns its state exclusively; every message is handled on the
//! actor thread in mailbox order, so state shared between a writer and a
//! periodic timer needs no lock as long as both go through the mailbox.

use std::any::type_name;
use std::marker::PhantomData;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use tokio::sync::oneshot;
use tracing::{debug, error};

pub trait Actor: Send + 'static {}

impl<T> Actor for T where T: Send + 'static {}

pub trait Message: Send + 'static {
    type Response: Send + 'static;
}

pub struct ActorContext<A: Actor> {
    stop_requested: bool,
    self_ref: Option<ActorRef<A>>,
    _marker: PhantomData<fn() -> A>,
}

impl<A: Actor> ActorContext<A> {
    fn new() -> Self {
        Self {
            stop_requested: false,
            self_ref: None,
            _marker: PhantomData,
        }
    }

    /// Ends the actor loop once the current message has been handled.
    pub fn stop(&mut self) {
        self.stop_requested = true;
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Reference to the running actor, available only inside a handler.
    ///
    /// Holding the returned reference keeps the mailbox open.
    pub fn actor_ref(&self) -> Option<ActorRef<A>> {
        self.self_ref.clone()
    }
}

pub trait Handler<M>: Actor + Sized
where
    M: Message,
{
    fn handle(&mut self, message: M, ctx: &mut ActorContext<Self>) -> M::Response;
}

trait Envelope<A: Actor>: Send + 'static {
    fn deliver(self: Box<Self>, actor: &mut A, ctx: &mut ActorContext<A>);
}

struct Cast<M, A: Actor> {
    message: M,
    sender: ActorRef<A>,
}

impl<M, A> Envelope<A> for Cast<M, A>
where
    M: Message<Response = ()>,
    A: Handler<M>,
{
    fn deliver(self: Box<Self>, actor: &mut A, ctx: &mut ActorContext<A>) {
        ctx.self_ref = Some(self.sender);
        actor.handle(self.message, ctx);
    }
}

struct Call<M: Message, A: Actor> {
    message: M,
    reply: oneshot::Sender<M::Response>,
    sender: ActorRef<A>,
}

impl<M, A> Envelope<A> for Call<M, A>
where
    M: Message,
    A: Handler<M>,
{
    fn deliver(self: Box<Self>, actor: &mut A, ctx: &mut ActorContext<A>) {
        ctx.self_ref = Some(self.sender);
        let response = actor.handle(self.message, ctx);
        let _ = self.reply.send(response);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastError {
    MailboxClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallError {
    MailboxClosed,
    Timeout,
    ActorStopped,
}

type Mail<A> = Box<dyn Envelope<A>>;

pub struct ActorRef<A: Actor> {
    tx: Sender<Mail<A>>,
}

impl<A: Actor> Clone for ActorRef<A> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<A: Actor> ActorRef<A> {
    /// Fire-and-forget delivery.
    pub fn cast<M>(&self, message: M) -> Result<(), CastError>
    where
        M: Message<Response = ()>,
        A: Handler<M>,
    {
        let mail: Mail<A> = Box::new(Cast::<M, A> {
            message,
            sender: self.clone(),
        });
        self.tx.send(mail).map_err(|_| CastError::MailboxClosed)
    }

    /// Blocking request/response; do not call from inside a tokio worker.
    pub fn call<M>(&self, message: M, timeout: Duration) -> Result<M::Response, CallError>
    where
        M: Message,
        A: Handler<M>,
    {
        crate::block_on(self.call_async(message, timeout))
    }

    pub async fn call_async<M>(
        &self,
        message: M,
        timeout: Duration,
    ) -> Result<M::Response, CallError>
    where
        M: Message,
        A: Handler<M>,
    {
        let reply_rx = self.post_call(message)?;
        match tokio::time::timeout(timeout, reply_rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(CallError::ActorStopped),
            Err(_) => Err(CallError::Timeout),
        }
    }

    fn post_call<M>(&self, message: M) -> Result<oneshot::Receiver<M::Response>, CallError>
    where
        M: Message,
        A: Handler<M>,
    {
        let (reply, reply_rx) = oneshot::channel();
        let mail: Mail<A> = Box::new(Call::<M, A> {
            message,
            reply,
            sender: self.clone(),
        });
        self.tx.send(mail).map_err(|_| CallError::MailboxClosed)?;
        Ok(reply_rx)
    }
}

pub fn spawn_actor<A: Actor>(actor: A) -> std::io::Result<(ActorRef<A>, JoinHandle<()>)> {
    spawn_actor_named(actor, "herring-actor")
}

pub fn spawn_actor_named<A: Actor>(
    actor: A,
    thread_name: impl Into<String>,
) -> std::io::Result<(ActorRef<A>, JoinHandle<()>)> {
    let (tx, rx) = crossbeam_channel::unbounded::<Mail<A>>();
    let actor_ref = ActorRef { tx };
    let join = thread::Builder::new()
        .name(thread_name.into())
        .spawn(move || run_mailbox(actor, rx))?;
    Ok((actor_ref, join))
}

fn run_mailbox<A: Actor>(mut actor: A, rx: Receiver<Mail<A>>) {
    let mut ctx = ActorContext::<A>::new();
    while let Ok(mail) = rx.recv() {
        let delivered = catch_unwind(AssertUnwindSafe(|| mail.deliver(&mut actor, &mut ctx)));
        ctx.self_ref = None;
        if delivered.is_err() {
            error!(actor = type_name::<A>(), "actor handler panicked, closing mailbox");
            break;
        }
        if ctx.is_stop_requested() {
            debug!(actor = type_name::<A>(), "actor stopped");
            break;
        }
    }
}
