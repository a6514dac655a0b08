use super::common::*;
use std::time::Duration;

use crate::enrichment::provider::{ProviderChain, ProviderError, Resolution, Site};
use crate::enrichment::Provider;

const TIMEOUT: Duration = Duration::from_millis(50);

#[tokio::test]
async fn first_answer_wins_and_later_providers_are_not_called() {
    let (first, first_calls) = StubProvider::new("first", Outcome::Found("R2".to_string()));
    let (second, second_calls) = StubProvider::new("second", Outcome::Found("R3".to_string()));
    let chain = ProviderChain::new("zoning", TIMEOUT).then(first).then(second);

    assert_eq!(chain.resolve(&site()).await, Resolution::Found("R2".to_string()));
    assert_eq!(calls(&first_calls), 1);
    assert_eq!(calls(&second_calls), 0);
}

#[tokio::test]
async fn failures_and_no_match_fall_through_in_order() {
    let (failing, failing_calls) = StubProvider::new("failing", Outcome::Fail);
    let (empty, empty_calls) = StubProvider::new("empty", Outcome::NoMatch);
    let (last, last_calls) = StubProvider::new("last", Outcome::Found(true));
    let chain = ProviderChain::new("bushfire_prone", TIMEOUT)
        .then(failing)
        .then(empty)
        .then(last);

    assert_eq!(chain.provider_names(), vec!["failing", "empty", "last"]);
    assert_eq!(chain.resolve(&site()).await, Resolution::Found(true));
    assert_eq!(calls(&failing_calls), 1);
    assert_eq!(calls(&empty_calls), 1);
    assert_eq!(calls(&last_calls), 1);
}

#[tokio::test]
async fn every_provider_failing_is_unknown_not_absent() {
    let (a, a_calls) = StubProvider::<bool>::new("a", Outcome::Fail);
    let (b, b_calls) = StubProvider::<bool>::new("b", Outcome::Fail);
    let chain = ProviderChain::new("flood", TIMEOUT).then(a).then(b);

    assert_eq!(chain.resolve(&site()).await, Resolution::Unknown);
    assert_eq!(calls(&a_calls), 1, "no retries");
    assert_eq!(calls(&b_calls), 1, "no retries");
}

#[tokio::test]
async fn authoritative_absence_stops_the_chain() {
    let (absent, _) = StubProvider::<bool>::new("absent", Outcome::Absent);
    let (after, after_calls) = StubProvider::new("after", Outcome::Found(true));
    let chain = ProviderChain::new("bushfire_prone", TIMEOUT).then(absent).then(after);

    assert_eq!(chain.resolve(&site()).await, Resolution::Absent);
    assert_eq!(calls(&after_calls), 0);
}

#[tokio::test]
async fn a_hung_provider_times_out_and_falls_back() {
    let (hung, _) = StubProvider::new("hung", Outcome::Hang);
    let (fallback, fallback_calls) = StubProvider::new("fallback", Outcome::Found(7.5_f64));
    let chain = ProviderChain::new("median_sale_price", TIMEOUT).then(hung).then(fallback);

    assert_eq!(chain.resolve(&site()).await, Resolution::Found(7.5));
    assert_eq!(calls(&fallback_calls), 1);
}

#[tokio::test]
async fn empty_chain_is_unknown() {
    let chain: ProviderChain<String> = ProviderChain::new("zoning", TIMEOUT);
    assert_eq!(chain.resolve(&site()).await, Resolution::Unknown);
}

#[tokio::test]
async fn spatial_providers_need_coordinates() {
    let provider = crate::enrichment::jurisdictions::vic::VicPlanningZone {
        service: std::sync::Arc::new(OfflineService),
    };
    let error = provider
        .lookup(&Site::default())
        .await
        .expect_err("no coordinates");
    assert!(matches!(error, ProviderError::MissingCoordinates));
}
