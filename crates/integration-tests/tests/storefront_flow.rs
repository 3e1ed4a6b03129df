//! Customer journey against a mock backend: login, cart, checkout, orders.

use chrono::NaiveDate;
use secrecy::SecretString;
use serde_json::json;
use tsirushka_client::{ApiError, Redirect};
use tsirushka_core::checkout::{
    AddressForm, CheckoutForm, CheckoutFormError, CustomerForm, DeliveryForm, PaymentInput,
    TransferInput,
};
use tsirushka_core::{Centimos, DeliveryMode, PaymentMethod, ProductId};
use tsirushka_integration_tests::{TestShop, catalog_product, token};
use tsirushka_storefront::pages::{AuthController, CheckoutController, orders, product};
use tsirushka_storefront::{CheckoutError, Navbar, NavLink};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1).unwrap_or_default()
}

fn san_jose() -> DeliveryForm {
    DeliveryForm {
        mode: DeliveryMode::Envio,
        address: AddressForm {
            province: "San José".into(),
            canton: "Escazú".into(),
            district: "San Rafael".into(),
            exact: "Del parque 200 m norte".into(),
            notes: String::new(),
        },
    }
}

fn pickup_sinpe_form() -> CheckoutForm {
    CheckoutForm {
        customer: CustomerForm {
            name: "Ana Mora".into(),
            email: "ana@correo.cr".into(),
            phone: "8888-0000".into(),
        },
        delivery: DeliveryForm {
            mode: DeliveryMode::Retiro,
            address: AddressForm::default(),
        },
        payment: PaymentInput::Transfer(TransferInput {
            reference: "998877".into(),
            payer_phone: "8888-0000".into(),
            notes: String::new(),
        }),
    }
}

async fn mount_product(shop: &TestShop) {
    Mock::given(method("GET"))
        .and(path("/catalogo/productos/12"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(catalog_product(12, "Barra 70%", 350_000, 8)),
        )
        .mount(&shop.server)
        .await;
}

#[tokio::test]
async fn test_login_cart_checkout_and_confirmation() {
    let shop = TestShop::start().await;
    let access = token(&json!({"sub": "ana@correo.cr", "roles": "ROLE_USER"}));

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_partial_json(json!({"email": "ana@correo.cr"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": access})))
        .expect(1)
        .mount(&shop.server)
        .await;
    mount_product(&shop).await;
    Mock::given(method("POST"))
        .and(path("/checkout/quote"))
        .and(header("authorization", format!("Bearer {access}").as_str()))
        .and(body_partial_json(json!({
            "items": [{"id": "12", "cantidad": 2}],
            "entrega": {"modo": "ENVIO"},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subtotalCentimos": 700_000,
            "envioCentimos": 250_000,
            "totalCentimos": 950_000,
        })))
        .mount(&shop.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/checkout/place-order"))
        .and(body_partial_json(json!({
            "items": [{"id": "12", "cantidad": 2}],
            "entrega": {"modo": "RETIRO", "direccion": null},
            "pago": {"metodo": "SINPE", "referencia": "998877"},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"orderId": 41})))
        .expect(1)
        .mount(&shop.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orders/41"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 41,
            "numeroPedido": "TS-0041",
            "estado": "PENDIENTE",
            "items": [{
                "productoNombre": "Barra 70%",
                "cantidad": 2,
                "precioUnitarioCentimos": 350_000,
                "subtotalCentimos": 700_000,
            }],
            "subtotalCentimos": 700_000,
            "envioCentimos": 0,
            "totalCentimos": 700_000,
        })))
        .mount(&shop.server)
        .await;

    let claims = AuthController::new(shop.state.clone())
        .login("ana@correo.cr", &SecretString::from("secreto123"))
        .await
        .expect("login");
    assert!(!claims.is_admin());

    let barra = product::load_product(&shop.state, &ProductId::new("12"))
        .await
        .expect("product");
    product::add_to_cart(&shop.state, &barra).expect("add");
    let qty = product::add_to_cart(&shop.state, &barra).expect("add again");
    assert_eq!(qty, 2);

    // Token and cart are on disk: a restarted app sees both.
    let restarted = shop.reopen();
    assert_eq!(restarted.cart().item_count(), 2);
    let nav = Navbar::build(&restarted);
    assert!(nav.links.contains(&NavLink::MyOrders));
    assert!(!nav.links.contains(&NavLink::Admin));
    assert_eq!(nav.cart_badge, Some(2));

    let mut checkout = CheckoutController::open(restarted.clone()).expect("logged in");
    let summary = checkout.refresh_quote(&san_jose()).await;
    assert_eq!(summary.shipping, Some(Centimos::new(250_000)));
    assert_eq!(summary.total, Centimos::new(950_000));

    let placed = checkout
        .place_order(&pickup_sinpe_form(), today())
        .await
        .expect("order placed");
    assert_eq!(placed.order_id.as_str(), "41");
    assert_eq!(placed.method, PaymentMethod::Sinpe);
    assert!(restarted.cart().is_empty(), "cart is cleared after ordering");

    let view = orders::confirmation(&restarted, &placed).await.expect("confirmation");
    assert_eq!(view.order.display_number(), "TS-0041");
    assert!(view.instructions.iter().any(|s| s.contains("+506 8630-4400")));
    assert!(view.instructions.iter().any(|s| s.contains("TS-0041")));
}

#[tokio::test]
async fn test_failed_quote_falls_back_to_subtotal() {
    let shop = TestShop::start().await;
    shop.log_in_as("ana@correo.cr", "ROLE_USER");
    mount_product(&shop).await;
    Mock::given(method("POST"))
        .and(path("/checkout/quote"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&shop.server)
        .await;

    let barra = product::load_product(&shop.state, &ProductId::new("12"))
        .await
        .expect("product");
    product::add_to_cart(&shop.state, &barra).expect("add");

    let mut checkout = CheckoutController::open(shop.state.clone()).expect("logged in");
    let summary = checkout.refresh_quote(&san_jose()).await;
    assert!(!summary.is_quoted());
    assert_eq!(summary.subtotal, Centimos::new(350_000));
    assert_eq!(summary.total, Centimos::new(350_000));
}

#[tokio::test]
async fn test_checkout_requires_login() {
    let shop = TestShop::start().await;

    let err = CheckoutController::open(shop.state.clone()).expect_err("no session");
    match err {
        CheckoutError::NotLoggedIn(Redirect::Login { return_to }) => {
            assert_eq!(return_to, "checkout");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_cart_is_rejected_without_a_request() {
    let shop = TestShop::start().await;
    shop.log_in_as("ana@correo.cr", "ROLE_USER");
    Mock::given(method("POST"))
        .and(path("/checkout/place-order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"orderId": 1})))
        .expect(0)
        .mount(&shop.server)
        .await;

    let mut checkout = CheckoutController::open(shop.state.clone()).expect("logged in");
    let err = checkout
        .place_order(&pickup_sinpe_form(), today())
        .await
        .expect_err("empty cart");
    assert!(matches!(err, CheckoutError::Form(CheckoutFormError::EmptyCart)));
}

#[tokio::test]
async fn test_rejected_order_keeps_the_cart() {
    let shop = TestShop::start().await;
    shop.log_in_as("ana@correo.cr", "ROLE_USER");
    mount_product(&shop).await;
    Mock::given(method("POST"))
        .and(path("/checkout/place-order"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "Stock insuficiente"})),
        )
        .mount(&shop.server)
        .await;

    let barra = product::load_product(&shop.state, &ProductId::new("12"))
        .await
        .expect("product");
    product::add_to_cart(&shop.state, &barra).expect("add");

    let mut checkout = CheckoutController::open(shop.state.clone()).expect("logged in");
    let err = checkout
        .place_order(&pickup_sinpe_form(), today())
        .await
        .expect_err("rejected");
    match err {
        CheckoutError::Api(ApiError::Http { status, message }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "Stock insuficiente");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(shop.state.cart().item_count(), 1);
}

#[tokio::test]
async fn test_my_orders_groups() {
    let shop = TestShop::start().await;
    shop.log_in_as("ana@correo.cr", "ROLE_USER");
    Mock::given(method("GET"))
        .and(path("/orders/mis-pedidos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "estado": "PENDIENTE", "totalCentimos": 100_000},
            {"id": 2, "estado": "PREPARANDO", "totalCentimos": 200_000},
            {"id": 3, "estado": "ENTREGADO", "totalCentimos": 300_000},
        ])))
        .mount(&shop.server)
        .await;

    let mine = orders::my_orders(&shop.state).await.expect("orders");
    assert_eq!(mine.orders.len(), 3);
    assert_eq!(
        mine.in_group(tsirushka_core::orders::OrderGroup::InProgress).count(),
        2
    );
    assert_eq!(
        mine.in_group(tsirushka_core::orders::OrderGroup::Delivered).count(),
        1
    );
}
