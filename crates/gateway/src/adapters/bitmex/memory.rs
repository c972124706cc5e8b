//! In-process transport
//!
//! Scripted REST responses plus a handler registry that `push` dispatches
//! to. Every request is recorded so callers can assert on what the adapter
//! sent. Used for tests and for wiring components together without a venue
//! connection.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use log::debug;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::mapper::OS_NEW;
use super::transport::{BitmexTransport, HandlerId, PushHandler, PushMessage, SubscribeInfo, Topic};
use super::types::{
    BitmexOrder, BucketedQuery, NewOrderRequest, OrderBookSnapshot, TradeBin, VersionInfo,
};
use crate::error::TransportError;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Registered {
    topic: Topic,
    handler: PushHandler,
}

#[derive(Default)]
struct Script {
    version: Option<VersionInfo>,
    order_book: Option<OrderBookSnapshot>,
    bins: Vec<TradeBin>,
    order_ack: Option<BitmexOrder>,
    failures: VecDeque<TransportError>,
    subscribe_failure: Option<TransportError>,
}

#[derive(Default)]
struct Journal {
    book_requests: Vec<(String, u32)>,
    bucketed: Vec<BucketedQuery>,
    orders: Vec<NewOrderRequest>,
    subscriptions: Vec<SubscribeInfo>,
}

#[derive(Default)]
pub struct MemoryTransport {
    handlers: DashMap<HandlerId, Registered>,
    next_handler: AtomicU64,
    push_started: AtomicBool,
    calls: AtomicU64,
    script: Mutex<Script>,
    journal: Mutex<Journal>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_version(&self, version: VersionInfo) {
        lock(&self.script).version = Some(version);
    }

    pub fn set_order_book(&self, snapshot: OrderBookSnapshot) {
        lock(&self.script).order_book = Some(snapshot);
    }

    pub fn set_bins(&self, bins: Vec<TradeBin>) {
        lock(&self.script).bins = bins;
    }

    /// Acknowledgment returned by `place_order`; without one the request is
    /// echoed back as a `New` order
    pub fn set_order_ack(&self, ack: BitmexOrder) {
        lock(&self.script).order_ack = Some(ack);
    }

    /// Fail the next REST call with `error`
    pub fn fail_next(&self, error: TransportError) {
        lock(&self.script).failures.push_back(error);
    }

    /// Fail the next subscription acknowledgment with `error`
    pub fn fail_subscribe(&self, error: TransportError) {
        lock(&self.script).subscribe_failure = Some(error);
    }

    /// Dispatch `message` to every handler registered for its topic
    ///
    /// Returns the number of handlers invoked.
    pub fn push(&self, message: PushMessage) -> usize {
        let topic = message.topic();
        let mut invoked = 0;
        for entry in self.handlers.iter() {
            if entry.topic == topic {
                (entry.handler)(message.clone());
                invoked += 1;
            }
        }
        invoked
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn push_started(&self) -> bool {
        self.push_started.load(Ordering::SeqCst)
    }

    /// Total transport calls made, push registration included
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn book_requests(&self) -> Vec<(String, u32)> {
        lock(&self.journal).book_requests.clone()
    }

    pub fn bucketed_queries(&self) -> Vec<BucketedQuery> {
        lock(&self.journal).bucketed.clone()
    }

    pub fn placed_orders(&self) -> Vec<NewOrderRequest> {
        lock(&self.journal).orders.clone()
    }

    pub fn subscriptions(&self) -> Vec<SubscribeInfo> {
        lock(&self.journal).subscriptions.clone()
    }

    fn begin_call(&self) -> Result<(), TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match lock(&self.script).failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn echo_ack(request: &NewOrderRequest) -> BitmexOrder {
    let now = Utc::now();
    BitmexOrder {
        order_id: uuid::Uuid::new_v4().to_string(),
        cl_ord_id: request.cl_ord_id.clone(),
        symbol: request.symbol.clone(),
        side: Some(request.side.clone()),
        order_qty: Some(request.order_qty),
        price: request.price,
        stop_px: request.stop_px,
        peg_offset_value: request.peg_offset_value,
        peg_price_type: request.peg_price_type.clone(),
        ord_type: Some(request.ord_type.clone()),
        exec_inst: request.exec_inst.clone(),
        ord_status: Some(OS_NEW.to_string()),
        timestamp: Some(now),
        transact_time: Some(now),
        ..Default::default()
    }
}

#[async_trait]
impl BitmexTransport for MemoryTransport {
    async fn get_version(&self) -> Result<VersionInfo, TransportError> {
        self.begin_call()?;
        lock(&self.script)
            .version
            .clone()
            .ok_or_else(|| TransportError::Request("no version scripted".to_string()))
    }

    async fn get_order_book(
        &self,
        symbol: &str,
        depth: u32,
    ) -> Result<OrderBookSnapshot, TransportError> {
        self.begin_call()?;
        lock(&self.journal)
            .book_requests
            .push((symbol.to_string(), depth));
        lock(&self.script)
            .order_book
            .clone()
            .ok_or_else(|| TransportError::Request("no order book scripted".to_string()))
    }

    async fn get_bucketed(&self, query: &BucketedQuery) -> Result<Vec<TradeBin>, TransportError> {
        self.begin_call()?;
        lock(&self.journal).bucketed.push(query.clone());
        Ok(lock(&self.script).bins.clone())
    }

    async fn place_order(&self, request: &NewOrderRequest) -> Result<BitmexOrder, TransportError> {
        self.begin_call()?;
        lock(&self.journal).orders.push(request.clone());
        let ack = lock(&self.script).order_ack.clone();
        Ok(ack.unwrap_or_else(|| echo_ack(request)))
    }

    async fn start_push(&self) -> Result<(), TransportError> {
        self.begin_call()?;
        self.push_started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn on(&self, topic: Topic, handler: PushHandler) -> HandlerId {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let id = self.next_handler.fetch_add(1, Ordering::SeqCst) + 1;
        self.handlers.insert(id, Registered { topic, handler });
        debug!("Registered handler {} on {}", id, topic);
        id
    }

    fn off(&self, id: HandlerId) {
        if self.handlers.remove(&id).is_some() {
            debug!("Removed handler {}", id);
        }
    }

    async fn subscribe(&self, subscriptions: &[SubscribeInfo]) -> Result<(), TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = lock(&self.script).subscribe_failure.take() {
            return Err(error);
        }
        lock(&self.journal)
            .subscriptions
            .extend(subscriptions.iter().cloned());
        Ok(())
    }
}
