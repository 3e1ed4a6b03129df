//! Navigation bar model.

use tsirushka_client::{AppState, CartSubscription};

/// A link in the navbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavLink {
    Home,
    Catalog,
    Services,
    Contact,
    Cart,
    MyOrders,
    Admin,
}

impl NavLink {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "Inicio",
            Self::Catalog => "Productos",
            Self::Services => "Servicios",
            Self::Contact => "Contacto",
            Self::Cart => "Carrito",
            Self::MyOrders => "Mis Pedidos",
            Self::Admin => "Admin",
        }
    }
}

/// What the navbar shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navbar {
    pub links: Vec<NavLink>,
    pub logged_in: bool,
    /// Units in the cart; `None` hides the badge.
    pub cart_badge: Option<u64>,
}

impl Navbar {
    /// Build the navbar for the current token and cart.
    ///
    /// The admin link depends on unverified token claims and only decides
    /// what is shown.
    #[must_use]
    pub fn build(state: &AppState) -> Self {
        let claims = state.tokens().claims();
        let logged_in = state.tokens().is_logged_in();

        let mut links = vec![
            NavLink::Home,
            NavLink::Catalog,
            NavLink::Services,
            NavLink::Contact,
            NavLink::Cart,
        ];
        if logged_in {
            links.push(NavLink::MyOrders);
        }
        if claims.is_some_and(|c| c.is_admin()) {
            links.push(NavLink::Admin);
        }

        Self {
            links,
            logged_in,
            cart_badge: badge(state.cart().item_count()),
        }
    }
}

const fn badge(count: u64) -> Option<u64> {
    if count == 0 { None } else { Some(count) }
}

/// Keeps the cart badge in step with the cart store.
#[derive(Debug)]
pub struct CartBadge {
    subscription: CartSubscription,
}

impl CartBadge {
    #[must_use]
    pub fn new(state: &AppState) -> Self {
        Self {
            subscription: state.cart().subscribe(),
        }
    }

    /// The badge value right now.
    #[must_use]
    pub fn current(&mut self) -> Option<u64> {
        badge(self.subscription.current().item_count())
    }

    /// Wait for the cart to change and return the new badge value.
    ///
    /// The outer `None` means the cart store is gone.
    pub async fn next(&mut self) -> Option<Option<u64>> {
        let cart = self.subscription.changed().await?;
        Some(badge(cart.item_count()))
    }
}
