use std::sync::Arc;

use common::decimal::{price, token, Amount};
use common::error::Error;
use common::model::Address;
use price_oracle::{FixedPriceFeed, PriceFeed};
use trading_engine::{VirtualsConfig, VirtualsService, BASE_TICKER};

fn vrt(value: &str) -> Amount {
    token::parse(value).unwrap()
}

fn fixed(value: &str) -> Arc<dyn PriceFeed> {
    Arc::new(FixedPriceFeed::new(price::parse(value).unwrap()))
}

async fn service_with_feeds() -> (VirtualsService, VirtualsConfig) {
    let config = VirtualsConfig::new(vrt("1000000"), Address::random(), Address::random(), false);
    let service = VirtualsService::with_config(&config).unwrap();

    service.add_or_update_price_feed(&config.owner, "BTC", fixed("600")).await.unwrap();
    service.add_or_update_price_feed(&config.owner, BASE_TICKER, fixed("50")).await.unwrap();

    (service, config)
}

#[tokio::test]
async fn test_buy_and_sell_through_service() {
    let (service, config) = service_with_feeds().await;
    let trader = Address::random();

    service.transfer(&config.owner, &trader, vrt("6.018")).await.unwrap();
    service.buy(&trader, "btc", vrt("0.5")).await.unwrap();

    assert_eq!(service.balance_of(&trader).await, 0);
    assert_eq!(service.position_of(&trader, "BTC").await.unwrap(), vrt("0.5"));

    service.add_or_update_price_feed(&config.owner, "BTC", fixed("400")).await.unwrap();
    assert_eq!(service.quote("BTC", vrt("0.5")).await.unwrap().token_amount, vrt("4"));

    service.transfer(&config.owner, &trader, vrt("0.012")).await.unwrap();
    service.sell(&trader, "BTC", vrt("0.5")).await.unwrap();

    let summary = service.account(&trader).await;
    assert_eq!(summary.balance, vrt("4"));
    assert!(summary.positions.is_empty());
    assert_eq!(service.fee_reserve().await, vrt("0.03"));
}

#[tokio::test]
async fn test_rejections_surface_through_service() {
    let (service, config) = service_with_feeds().await;
    let stranger = Address::random();

    let result = service.add_or_update_price_feed(&stranger, "ETH", fixed("30")).await;
    assert!(matches!(result, Err(Error::Unauthorized(_))));

    assert!(matches!(service.price_of("ETH").await, Err(Error::UnknownTicker(_))));
    assert!(matches!(service.buy(&stranger, "BTC/USD", vrt("1")).await, Err(Error::ValidationError(_))));
    assert!(matches!(
        service.sell(&stranger, "BTC", vrt("1")).await,
        Err(Error::InsufficientPosition(_))
    ));
    assert!(matches!(
        service.transfer(&stranger, &config.owner, 1).await,
        Err(Error::InsufficientBalance(_))
    ));
}

#[tokio::test]
async fn test_concurrent_trades_are_serialized() {
    let (service, config) = service_with_feeds().await;
    let traders: Vec<Address> = (0..8).map(|_| Address::random()).collect();

    for trader in &traders {
        service.transfer(&config.owner, trader, vrt("100")).await.unwrap();
    }

    let mut handles = Vec::new();
    for trader in traders.clone() {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..10 {
                service.buy(&trader, "BTC", vrt("0.1")).await.unwrap();
            }
            service.sell(&trader, "BTC", vrt("0.5")).await.unwrap();
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    // Each trader bought 1 BTC for 12 VRT and sold 0.5 back for 6 VRT
    let expected_fees = (vrt("1.2") * 3 / 1000) * 10 + vrt("6") * 3 / 1000;
    for trader in &traders {
        assert_eq!(service.position_of(trader, "BTC").await.unwrap(), vrt("0.5"));
        assert_eq!(service.balance_of(trader).await, vrt("100") - vrt("12") + vrt("6") - expected_fees);
    }

    let (total, sum) = service
        .inspect(|engine| {
            let mut sum: Amount = traders.iter().map(|t| engine.balance_of(t)).sum();
            sum += engine.balance_of(&config.owner) + engine.fee_reserve();
            (engine.total_supply(), sum)
        })
        .await;
    assert_eq!(total, sum);
}

#[tokio::test]
async fn test_event_log_is_ordered() {
    let (service, config) = service_with_feeds().await;
    let trader = Address::random();

    service.transfer(&config.owner, &trader, vrt("10")).await.unwrap();
    service.buy(&trader, "BTC", vrt("0.5")).await.unwrap();

    let events = service.events_since(0).await;
    assert!(!events.is_empty());
    for (index, event) in events.iter().enumerate() {
        assert_eq!(event.sequence, index as u64);
    }

    let json = serde_json::to_string(&events).unwrap();
    assert!(json.contains("\"type\":\"bought\""));
    assert!(json.contains("\"type\":\"price_feed_updated\""));
}

#[test]
fn test_config_from_env() {
    std::env::set_var("VRT_INITIAL_SUPPLY", "2500.5");
    std::env::set_var("VRT_OWNER", "0x1111111111111111111111111111111111111111");
    std::env::set_var("VRT_EVENT_LOGGING", "1");

    let config = VirtualsConfig::from_env().unwrap();
    assert_eq!(config.initial_supply, vrt("2500.5"));
    assert_eq!(config.owner.to_string(), "0x1111111111111111111111111111111111111111");
    assert!(config.event_logging);

    std::env::set_var("VRT_OWNER", "not-an-address");
    assert!(matches!(VirtualsConfig::from_env(), Err(Error::ConfigurationError(_))));

    std::env::remove_var("VRT_INITIAL_SUPPLY");
    std::env::remove_var("VRT_OWNER");
    std::env::remove_var("VRT_EVENT_LOGGING");
}

#[tokio::test]
async fn test_command_line_overrides_config() {
    let owner = Address::random();
    let reserve = Address::random();
    let base = VirtualsConfig::new(vrt("1000000"), owner, reserve, true);

    let unchanged = base.clone().with_overrides(None, None, None, false);
    assert_eq!(unchanged.initial_supply, vrt("1000000"));
    assert_eq!(unchanged.owner, owner);
    assert_eq!(unchanged.contract_address, reserve);
    assert!(unchanged.event_logging);

    let cli_owner: Address = "0x2222222222222222222222222222222222222222".parse().unwrap();
    let overridden = VirtualsConfig::new(vrt("1000000"), owner, reserve, false)
        .with_overrides(Some(vrt("42.5")), Some(cli_owner), None, true);
    assert_eq!(overridden.initial_supply, vrt("42.5"));
    assert_eq!(overridden.owner, cli_owner);
    assert_eq!(overridden.contract_address, reserve);
    assert!(overridden.event_logging);

    let service = VirtualsService::with_config(&overridden).unwrap();
    assert_eq!(service.total_supply().await, vrt("42.5"));
    assert_eq!(service.balance_of(&cli_owner).await, vrt("42.5"));
}
