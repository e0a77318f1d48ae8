use serde::Serialize;

/// A product card on the storefront page.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogProduct {
    pub name: &'static str,
    pub price: &'static str,
    pub description: &'static str,
}

pub const CATALOG: &[CatalogProduct] = &[
    CatalogProduct {
        name: "Espresso Blend",
        price: "₹350.00",
        description: "Dark roast with cocoa and toasted almond notes.",
    },
    CatalogProduct {
        name: "Monsoon Malabar",
        price: "₹420.00",
        description: "Low acidity, earthy and full bodied.",
    },
    CatalogProduct {
        name: "Chikmagalur Estate",
        price: "₹480.00",
        description: "Single estate arabica with jaggery sweetness.",
    },
    CatalogProduct {
        name: "Cold Brew Pack",
        price: "₹299.00",
        description: "Coarse ground for overnight steeping.",
    },
];
