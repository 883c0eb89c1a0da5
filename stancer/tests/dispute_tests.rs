mod common;

use common::{FakeHttp, fake_client};
use pretty_assertions::assert_eq;
use serde_json::json;
use stancer::{Dispute, ListParams, Refund, Resource, Result, Searchable};

// ── Disputes ─────────────────────────────────────────────────────

#[test]
fn disputes_are_listed_with_lazy_payments() {
    let http = FakeHttp::new();
    http.respond_json(json!({
        "live_mode": false,
        "range": {"has_more": false, "start": 0, "limit": 10},
        "disputes": [
            {
                "id": "dspt_kkyLpFvqM8JYQrBJlhN9bxSY",
                "amount": 1000,
                "currency": "eur",
                "order_id": "815730837",
                "payment": "paym_oTwazegPAYD7PdjOHmmVfnR5",
                "response": "45",
                "created": 1_541_586_000
            }
        ]
    }));
    http.respond_json(json!({
        "id": "paym_oTwazegPAYD7PdjOHmmVfnR5",
        "amount": 1000,
        "currency": "eur",
        "status": "disputed"
    }));

    let client = fake_client(&http);
    let disputes: Vec<Dispute> = Dispute::list(&client, &ListParams::new().limit(10))
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();

    let dispute = &disputes[0];
    assert_eq!(dispute.amount().unwrap(), Some(1000));
    assert_eq!(dispute.order_id().unwrap().as_deref(), Some("815730837"));
    assert_eq!(dispute.response().unwrap().as_deref(), Some("45"));
    assert_eq!(http.request_count(), 1);
    assert_eq!(http.last_request().url, "https://api.stancer.com/v1/disputes");

    let payment = dispute.payment().unwrap().unwrap();
    assert_eq!(payment.status().unwrap().as_deref(), Some("disputed"));
    assert_eq!(http.request_count(), 2);
    assert_eq!(
        http.last_request().url,
        "https://api.stancer.com/v1/checkout/paym_oTwazegPAYD7PdjOHmmVfnR5"
    );
}

#[test]
fn disputes_are_never_sent() {
    let http = FakeHttp::new();
    http.respond_json(json!({"id": "dspt_1", "amount": 1000, "response": "45"}));

    let dispute = Dispute::retrieve(&fake_client(&http), "dspt_1");
    dispute.populate().unwrap();
    dispute.hydrate([("response", "46")]).unwrap();

    assert_eq!(dispute.to_json_repr(), json!({}));
}

// ── Refunds ──────────────────────────────────────────────────────

#[test]
fn retrieved_refund() {
    let http = FakeHttp::new();
    http.respond_json(json!({
        "id": "refd_1",
        "amount": 500,
        "currency": "eur",
        "payment": "paym_1",
        "status": "refunded",
        "date_bank": 1_597_330_145,
        "date_refund": 1_597_243_745
    }));

    let refund = Refund::retrieve(&fake_client(&http), "refd_1");
    assert_eq!(refund.status().unwrap().as_deref(), Some("refunded"));
    assert_eq!(refund.currency().unwrap().as_deref(), Some("eur"));
    assert_eq!(
        refund.date_bank().unwrap().map(|date| date.timestamp()),
        Some(1_597_330_145)
    );

    let payment = refund.payment().unwrap().unwrap();
    assert_eq!(payment.id().as_deref(), Some("paym_1"));
    assert_eq!(http.request_count(), 1);
    assert_eq!(http.last_request().url, "https://api.stancer.com/v1/refunds/refd_1");
}
