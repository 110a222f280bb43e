//! Seeds the OHADA chart of accounts and the 14 standard journals.
//!
//! The collective accounts (40110000, 40120000, 41110000, 41120000,
//! 42100000) MUST exist before any counterparty is created; running this
//! seeder is what makes `TiersRepository::create` possible.
//!
//! Usage: cargo run --bin seeder

use grandlivre_core::account::{AccountNature, NormalBalance};
use grandlivre_core::journal::JournalKind;
use grandlivre_db::repositories::account::CreateAccountInput;
use grandlivre_db::repositories::journal::CreateJournalInput;
use grandlivre_db::{AccountRepository, JournalRepository};
use grandlivre_shared::AppConfig;

/// One row of the seed chart of accounts.
struct SeedAccount {
    code: &'static str,
    label: &'static str,
    nature: AccountNature,
    normal_balance: NormalBalance,
}

const CHART: &[SeedAccount] = &[
    SeedAccount {
        code: "10100000",
        label: "Capital social",
        nature: AccountNature::Liability,
        normal_balance: NormalBalance::Credit,
    },
    SeedAccount {
        code: "24100000",
        label: "Matériel et outillage",
        nature: AccountNature::Asset,
        normal_balance: NormalBalance::Debit,
    },
    SeedAccount {
        code: "31100000",
        label: "Marchandises",
        nature: AccountNature::Asset,
        normal_balance: NormalBalance::Debit,
    },
    SeedAccount {
        code: "40110000",
        label: "Fournisseurs locaux",
        nature: AccountNature::Liability,
        normal_balance: NormalBalance::Credit,
    },
    SeedAccount {
        code: "40120000",
        label: "Fournisseurs groupe",
        nature: AccountNature::Liability,
        normal_balance: NormalBalance::Credit,
    },
    SeedAccount {
        code: "41110000",
        label: "Clients locaux",
        nature: AccountNature::Asset,
        normal_balance: NormalBalance::Debit,
    },
    SeedAccount {
        code: "41120000",
        label: "Clients groupe",
        nature: AccountNature::Asset,
        normal_balance: NormalBalance::Debit,
    },
    SeedAccount {
        code: "42100000",
        label: "Personnel, rémunérations dues",
        nature: AccountNature::Liability,
        normal_balance: NormalBalance::Credit,
    },
    SeedAccount {
        code: "44310000",
        label: "État, TVA facturée",
        nature: AccountNature::Liability,
        normal_balance: NormalBalance::Credit,
    },
    SeedAccount {
        code: "44560000",
        label: "État, TVA déductible",
        nature: AccountNature::Asset,
        normal_balance: NormalBalance::Debit,
    },
    SeedAccount {
        code: "52100000",
        label: "Banques",
        nature: AccountNature::Asset,
        normal_balance: NormalBalance::Variable,
    },
    SeedAccount {
        code: "57100000",
        label: "Caisse",
        nature: AccountNature::Asset,
        normal_balance: NormalBalance::Debit,
    },
    SeedAccount {
        code: "60110000",
        label: "Achats de marchandises",
        nature: AccountNature::Expense,
        normal_balance: NormalBalance::Debit,
    },
    SeedAccount {
        code: "62200000",
        label: "Locations et charges locatives",
        nature: AccountNature::Expense,
        normal_balance: NormalBalance::Debit,
    },
    SeedAccount {
        code: "66100000",
        label: "Rémunérations directes versées au personnel",
        nature: AccountNature::Expense,
        normal_balance: NormalBalance::Debit,
    },
    SeedAccount {
        code: "70110000",
        label: "Ventes de marchandises",
        nature: AccountNature::Income,
        normal_balance: NormalBalance::Credit,
    },
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let database_url = match AppConfig::load() {
        Ok(config) => config.database.url,
        Err(_) => std::env::var("DATABASE_URL")
            .expect("set GRANDLIVRE__DATABASE__URL or DATABASE_URL in the environment"),
    };

    tracing::info!("connecting to database");
    let db = grandlivre_db::connect(&database_url)
        .await
        .expect("failed to connect to database");

    seed_accounts(&db).await;
    seed_journals(&db).await;

    tracing::info!("seeding complete");
}

async fn seed_accounts(db: &sea_orm::DatabaseConnection) {
    let repository = AccountRepository::new(db.clone());

    for seed in CHART {
        let existing = repository
            .find_by_code(seed.code)
            .await
            .expect("failed to query accounts");
        if existing.is_some() {
            tracing::debug!(code = seed.code, "account already seeded");
            continue;
        }

        repository
            .create(CreateAccountInput {
                code: seed.code.to_string(),
                label: seed.label.to_string(),
                nature: seed.nature,
                normal_balance: seed.normal_balance,
                reference: None,
                note: None,
            })
            .await
            .expect("failed to seed account");
    }
    tracing::info!(accounts = CHART.len(), "chart of accounts seeded");
}

async fn seed_journals(db: &sea_orm::DatabaseConnection) {
    let repository = JournalRepository::new(db.clone());

    for kind in JournalKind::ALL {
        let code = kind.conventional_code();
        let existing = repository
            .find_by_code(code)
            .await
            .expect("failed to query journals");
        if existing.is_some() {
            tracing::debug!(code, "journal already seeded");
            continue;
        }

        repository
            .create(CreateJournalInput {
                code: code.to_string(),
                label: kind.label().to_string(),
                kind,
                counter_account: None,
            })
            .await
            .expect("failed to seed journal");
    }
    tracing::info!(journals = JournalKind::ALL.len(), "journals seeded");
}
