use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use list_core::{
    InfiniteList, ListConfig, ListView, MemoryQueryStore, PageFetcher, PageRequest, PageResult,
    QueryStore, QueryUpdate, StaticPageFetcher,
};
use shared::domain::Asset;
use tokio::sync::{mpsc, oneshot};

type Reply = oneshot::Sender<Result<PageResult<&'static str>>>;
type Calls = mpsc::UnboundedReceiver<(PageRequest, Reply)>;

struct GatedFetcher {
    calls: mpsc::UnboundedSender<(PageRequest, Reply)>,
}

#[async_trait]
impl PageFetcher<&'static str> for GatedFetcher {
    async fn fetch_page(&self, request: PageRequest) -> Result<PageResult<&'static str>> {
        let (tx, rx) = oneshot::channel();
        self.calls
            .send((request, tx))
            .map_err(|_| anyhow!("fetch queue closed"))?;
        rx.await.map_err(|_| anyhow!("reply dropped"))?
    }
}

fn gated_list(location: &str) -> (InfiniteList<&'static str>, Arc<MemoryQueryStore>, Calls) {
    let (tx, calls) = mpsc::unbounded_channel();
    let store = MemoryQueryStore::from_query_string(location);
    let list = InfiniteList::new(
        Arc::new(GatedFetcher { calls: tx }),
        store.clone(),
        ListConfig::default(),
    )
    .expect("list");
    (list, store, calls)
}

async fn next_call(calls: &mut Calls) -> (PageRequest, Reply) {
    tokio::time::timeout(Duration::from_secs(1), calls.recv())
        .await
        .expect("a fetch was issued")
        .expect("fetch queue open")
}

async fn assert_no_call(calls: &mut Calls) {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
    assert!(calls.try_recv().is_err(), "unexpected fetch issued");
}

async fn settled<T: Clone + Send + Sync + 'static>(list: &InfiniteList<T>) -> ListView<T> {
    tokio::time::timeout(Duration::from_secs(1), list.settled())
        .await
        .expect("list settles")
}

fn page(
    data: &[&'static str],
    page: u32,
    total: u64,
    has_more: bool,
) -> Result<PageResult<&'static str>> {
    Ok(PageResult {
        data: data.to_vec(),
        page,
        page_size: 20,
        total,
        has_more,
    })
}

#[tokio::test]
async fn load_more_appends_second_page_until_end_reached() {
    let (list, store, mut calls) = gated_list("page=1");

    let (request, reply) = next_call(&mut calls).await;
    assert_eq!(request, PageRequest::new(1, 20, ""));
    reply.send(page(&["A"], 1, 2, true)).expect("reply");
    let view = settled(&list).await;
    assert_eq!(view.items, vec!["A"]);
    assert!(view.has_more);

    list.load_more();
    assert_eq!(store.location().get("page"), Some("2"));

    let (request, reply) = next_call(&mut calls).await;
    assert_eq!(request, PageRequest::new(2, 20, ""));
    assert!(list.snapshot().is_page_loading);
    reply.send(page(&["B"], 2, 2, false)).expect("reply");

    let view = settled(&list).await;
    assert_eq!(view.items, vec!["A", "B"]);
    assert!(!view.has_more);
    assert!(view.is_end_reached);
    assert_eq!(view.total, 2);
    assert_eq!(view.current_page, 2);
}

#[tokio::test]
async fn load_more_is_ignored_once_list_is_exhausted() {
    let (list, store, mut calls) = gated_list("");
    let (_, reply) = next_call(&mut calls).await;
    reply.send(page(&["A"], 1, 1, false)).expect("reply");
    settled(&list).await;

    list.load_more();

    assert_no_call(&mut calls).await;
    assert_eq!(store.location().get("page"), None);
}

#[tokio::test]
async fn double_load_more_issues_one_fetch() {
    let (list, store, mut calls) = gated_list("");
    let (_, reply) = next_call(&mut calls).await;
    reply.send(page(&["A"], 1, 3, true)).expect("reply");
    settled(&list).await;

    list.load_more();
    list.load_more();

    let (request, _reply) = next_call(&mut calls).await;
    assert_eq!(request.page, 2);
    assert_no_call(&mut calls).await;
    assert_eq!(store.location().get("page"), Some("2"));
}

#[tokio::test]
async fn search_during_pending_page_discards_late_page() {
    let (list, _store, mut calls) = gated_list("");
    let (_, reply) = next_call(&mut calls).await;
    reply.send(page(&["A"], 1, 2, true)).expect("reply");
    settled(&list).await;

    list.load_more();
    let (_, page_two) = next_call(&mut calls).await;

    list.search("eth");
    let (request, eth_reply) = next_call(&mut calls).await;
    assert_eq!(request, PageRequest::new(1, 20, "eth"));

    // The superseded page 2 arrives first and must not land in the list.
    page_two.send(page(&["B"], 2, 2, false)).expect("reply");
    assert_no_call(&mut calls).await;
    let view = list.snapshot();
    assert!(view.items.is_empty());
    assert!(view.is_loading);

    eth_reply.send(page(&["ETH"], 1, 1, false)).expect("reply");
    let view = settled(&list).await;
    assert_eq!(view.items, vec!["ETH"]);
    assert_eq!(view.search_query, "eth");
    assert_eq!(view.current_page, 1);
}

#[tokio::test]
async fn only_latest_search_commits_regardless_of_resolution_order() {
    let (list, _store, mut calls) = gated_list("");
    let (_, initial) = next_call(&mut calls).await;

    list.search("b");
    let (_, first) = next_call(&mut calls).await;
    list.search("bt");
    let (_, second) = next_call(&mut calls).await;

    second.send(page(&["BTC"], 1, 1, false)).expect("reply");
    let view = settled(&list).await;
    assert_eq!(view.items, vec!["BTC"]);

    first.send(page(&["BNB", "BTC"], 1, 2, false)).expect("reply");
    initial.send(page(&["ALL"], 1, 99, true)).expect("reply");
    assert_no_call(&mut calls).await;

    let view = list.snapshot();
    assert_eq!(view.items, vec!["BTC"]);
    assert_eq!(view.total, 1);
    assert_eq!(view.search_query, "bt");
}

#[tokio::test]
async fn external_navigation_to_new_search_resets_like_search() {
    let (list, store, mut calls) = gated_list("q=btc");
    let (request, reply) = next_call(&mut calls).await;
    assert_eq!(request.search.as_deref(), Some("btc"));
    reply.send(page(&["BTC"], 1, 1, false)).expect("reply");
    settled(&list).await;

    store.update(QueryUpdate::new().set("q", "sol"));

    let (request, reply) = next_call(&mut calls).await;
    assert_eq!(request, PageRequest::new(1, 20, "sol"));
    assert!(list.snapshot().items.is_empty());
    reply.send(page(&["SOL"], 1, 1, false)).expect("reply");
    assert_eq!(settled(&list).await.items, vec!["SOL"]);
}

#[tokio::test]
async fn failing_first_page_exposes_error_message() {
    let (list, _store, mut calls) = gated_list("");
    let (_, reply) = next_call(&mut calls).await;
    reply.send(Err(anyhow!("boom"))).expect("reply");

    let view = settled(&list).await;
    assert!(view.is_error);
    assert_eq!(view.error.as_ref().map(|err| err.message()), Some("boom"));
    assert!(view.items.is_empty());
    assert!(view.is_empty);
}

#[tokio::test]
async fn retry_after_failure_clears_error_and_loads() {
    let (list, _store, mut calls) = gated_list("");
    let (_, reply) = next_call(&mut calls).await;
    reply.send(Err(anyhow!("network down"))).expect("reply");
    assert!(settled(&list).await.is_error);

    let answer = async {
        let (request, reply) = next_call(&mut calls).await;
        assert_eq!(request, PageRequest::new(1, 20, ""));
        reply.send(page(&["A"], 1, 1, false)).expect("reply");
    };
    tokio::join!(list.retry(), answer);

    let view = list.snapshot();
    assert!(!view.is_error);
    assert!(view.error.is_none());
    assert_eq!(view.items, vec!["A"]);
}

#[tokio::test]
async fn failed_later_page_keeps_items_and_retry_appends() {
    let (list, _store, mut calls) = gated_list("");
    let (_, reply) = next_call(&mut calls).await;
    reply.send(page(&["A"], 1, 2, true)).expect("reply");
    settled(&list).await;

    list.load_more();
    let (_, reply) = next_call(&mut calls).await;
    reply.send(Err(anyhow!("timeout"))).expect("reply");

    let view = settled(&list).await;
    assert!(view.is_error);
    assert_eq!(view.items, vec!["A"]);
    assert!(view.has_more);
    assert_eq!(view.current_page, 2);

    let answer = async {
        let (request, reply) = next_call(&mut calls).await;
        assert_eq!(request.page, 2);
        reply.send(page(&["B"], 2, 2, false)).expect("reply");
    };
    tokio::join!(list.retry(), answer);

    let view = list.snapshot();
    assert!(!view.is_error);
    assert_eq!(view.items, vec!["A", "B"]);
    assert!(view.is_end_reached);
}

#[tokio::test]
async fn page_decrease_is_inert() {
    let (list, store, mut calls) = gated_list("");
    let (_, reply) = next_call(&mut calls).await;
    reply.send(page(&["A"], 1, 3, true)).expect("reply");
    settled(&list).await;
    list.load_more();
    let (_, reply) = next_call(&mut calls).await;
    reply.send(page(&["B"], 2, 3, true)).expect("reply");
    settled(&list).await;

    store.update(QueryUpdate::new().set("page", 1));

    assert_no_call(&mut calls).await;
    assert_eq!(list.snapshot().items, vec!["A", "B"]);
}

#[tokio::test]
async fn sequential_pages_concatenate_in_order() {
    let assets: Vec<Asset> = (1..=7)
        .map(|rank| {
            let id = format!("asset-{rank}");
            Asset::new(id.as_str(), "AST", "Asset").with_rank(rank)
        })
        .collect();
    let store = MemoryQueryStore::from_query_string("");
    let list: InfiniteList<Asset> = InfiniteList::new(
        Arc::new(StaticPageFetcher::new(assets)),
        store.clone(),
        ListConfig::default().with_page_size(3),
    )
    .expect("list");

    for _ in 0..5 {
        settled(&list).await;
        list.load_more();
    }
    let view = settled(&list).await;

    let ranks: Vec<Option<u32>> = view.items.iter().map(|asset| asset.market_cap_rank).collect();
    assert_eq!(ranks, (1..=7).map(Some).collect::<Vec<_>>());
    assert_eq!(view.total, 7);
    assert!(view.is_end_reached);
    assert_eq!(store.location().get("page"), Some("3"));
}

#[tokio::test]
async fn starting_past_first_page_rewinds_location_and_loads_in_order() {
    let (list, store, mut calls) = gated_list("page=3&q=eth");

    let (request, reply) = next_call(&mut calls).await;
    assert_eq!(request, PageRequest::new(1, 20, "eth"));
    assert_eq!(store.location().to_query_string(), "q=eth");
    assert_no_call(&mut calls).await;

    reply.send(page(&["P1"], 1, 3, true)).expect("reply");
    let view = settled(&list).await;
    assert_eq!(view.items, vec!["P1"]);
    assert_eq!(view.current_page, 1);

    list.load_more();
    let (request, reply) = next_call(&mut calls).await;
    assert_eq!(request, PageRequest::new(2, 20, "eth"));
    reply.send(page(&["P2"], 2, 3, true)).expect("reply");

    let view = settled(&list).await;
    assert_eq!(view.items, vec!["P1", "P2"]);
    assert_eq!(view.current_page, 2);
}

#[tokio::test]
async fn bouncing_back_to_loaded_search_refetches_it() {
    let (list, _store, mut calls) = gated_list("q=eth");
    let (_, reply) = next_call(&mut calls).await;
    reply.send(page(&["ETH"], 1, 1, false)).expect("reply");
    settled(&list).await;

    list.search("btc");
    let (_, btc_reply) = next_call(&mut calls).await;

    list.search("eth");
    let (request, eth_reply) = next_call(&mut calls).await;
    assert_eq!(request, PageRequest::new(1, 20, "eth"));

    btc_reply.send(page(&["BTC"], 1, 1, false)).expect("reply");
    assert_no_call(&mut calls).await;
    assert!(list.snapshot().items.is_empty());

    eth_reply.send(page(&["ETH", "ETC"], 1, 2, false)).expect("reply");
    let view = settled(&list).await;
    assert_eq!(view.search_query, "eth");
    assert_eq!(view.items, vec!["ETH", "ETC"]);
}
