use rust_decimal::Decimal;

use crate::domain::catalog::{
    DoughType, FlavorCategory, FlavorKind, NewDeliveryPerson, NewFlavor, NewProduct,
    ProductCategory, Transport,
};
use super::{Store, StoreResult};

// ============================================================================
// Starter Catalog
// ============================================================================
//
// Same rows as migrations/*_seed.sql, for stores that do not run migrations
// (in-memory demo mode and tests). Prices are in cents.
//
// ============================================================================

const DOUGH_COUNTERS: &[(&str, ProductCategory, DoughType, i32)] = &[
    ("Massa de Pizza", ProductCategory::PizzaTradicional, DoughType::Pizza, 50),
    ("Massa de Esfiha", ProductCategory::EsfihaTradicional, DoughType::Esfiha, 100),
];

const BEVERAGES: &[(&str, i64, i32)] = &[
    ("Coca-Cola 2L", 800, 25),
    ("Guaraná 2L", 800, 20),
    ("Coca-Cola Lata", 350, 48),
    ("Guaraná Lata", 350, 36),
    ("Água 500ml", 200, 50),
    ("Suco Natural", 500, 15),
];

const PIZZA_FLAVORS: &[(&str, FlavorCategory, i64)] = &[
    ("Margherita", FlavorCategory::Tradicional, 2500),
    ("Calabresa", FlavorCategory::Tradicional, 2500),
    ("Portuguesa", FlavorCategory::Tradicional, 2500),
    ("Mussarela", FlavorCategory::Tradicional, 2500),
    ("Napolitana", FlavorCategory::Tradicional, 2500),
    ("Frango Catupiry", FlavorCategory::Premium, 2700),
    ("Bacon", FlavorCategory::Premium, 2700),
    ("Quatro Queijos", FlavorCategory::Premium, 2700),
    ("Pepperoni", FlavorCategory::Premium, 2700),
    ("Toscana", FlavorCategory::Premium, 2700),
    ("Camarão", FlavorCategory::Especial, 3200),
    ("Salmão", FlavorCategory::Especial, 3200),
    ("Vegetariana Gourmet", FlavorCategory::Especial, 3200),
    ("Chocolate", FlavorCategory::Especial, 3200),
    ("Banana Nevada", FlavorCategory::Especial, 3200),
];

const ESFIHA_FLAVORS: &[(&str, FlavorCategory, i64)] = &[
    ("Carne", FlavorCategory::Tradicional, 250),
    ("Frango", FlavorCategory::Tradicional, 250),
    ("Queijo", FlavorCategory::Tradicional, 250),
    ("Pizza", FlavorCategory::Tradicional, 250),
    ("Carne Seca", FlavorCategory::Premium, 350),
    ("Frango Catupiry", FlavorCategory::Premium, 350),
    ("Camarão", FlavorCategory::Premium, 350),
    ("Chocolate", FlavorCategory::Especial, 350),
    ("Doce de Leite", FlavorCategory::Especial, 350),
];

const DELIVERY_STAFF: &[(&str, Transport, &str)] = &[
    ("João Silva", Transport::Moto, "(11) 91234-5678"),
    ("Maria Santos", Transport::Bicicleta, "(11) 92345-6789"),
    ("Pedro Oliveira", Transport::Moto, "(11) 93456-7890"),
    ("Ana Costa", Transport::Pe, "(11) 94567-8901"),
];

/// Insert the starter catalog into an empty store.
pub async fn seed_catalog(store: &dyn Store) -> StoreResult<()> {
    for &(name, category, dough, stock) in DOUGH_COUNTERS {
        store
            .create_product(NewProduct {
                name: name.to_string(),
                category,
                price: Decimal::ZERO,
                description: None,
                stock_quantity: stock,
                dough_type: Some(dough),
            })
            .await?;
    }

    for &(name, cents, stock) in BEVERAGES {
        store
            .create_product(NewProduct {
                name: name.to_string(),
                category: ProductCategory::Bebida,
                price: Decimal::new(cents, 2),
                description: None,
                stock_quantity: stock,
                dough_type: None,
            })
            .await?;
    }

    for (kind, flavors) in [
        (FlavorKind::Pizza, PIZZA_FLAVORS),
        (FlavorKind::Esfiha, ESFIHA_FLAVORS),
    ] {
        for &(name, category, cents) in flavors {
            store
                .create_flavor(
                    kind,
                    NewFlavor {
                        name: name.to_string(),
                        category,
                        price: Decimal::new(cents, 2),
                        active: true,
                    },
                )
                .await?;
        }
    }

    for &(name, transport, phone) in DELIVERY_STAFF {
        store
            .create_delivery_person(NewDeliveryPerson {
                name: name.to_string(),
                transport,
                phone: Some(phone.to_string()),
                active: true,
            })
            .await?;
    }

    tracing::info!(
        products = DOUGH_COUNTERS.len() + BEVERAGES.len(),
        pizza_flavors = PIZZA_FLAVORS.len(),
        esfiha_flavors = ESFIHA_FLAVORS.len(),
        delivery_persons = DELIVERY_STAFF.len(),
        "Seeded starter catalog"
    );
    Ok(())
}
