//! Bulk import and export of whole tables as CSV or JSON files.
//!
//! CSV files carry the table's column names as a header row and the stored values
//! verbatim. A CSV import is all-or-nothing: rows are matched to columns by position and
//! inserted on one transaction that is only committed if every row succeeds.
//!
//! JSON imports exist for clients and products only. Each record receives a freshly
//! generated identifier and is stored on its own; a record that cannot be read, fails
//! validation or is refused by the store is logged and skipped while the rest continue.

use super::client::{ClientDraft, add_client};
use super::ids::{IdKind, IdScheme, current_sequence};
use super::product::{ProductDraft, add_product};
use crate::{
    entities::{Client, ClientModel, Order, OrderItem, Product, Validate, client, order, order_item, product},
    errors::{Error, Result},
};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IdenStatic, IntoActiveModel,
    Iterable, TransactionTrait,
};
use serde::{Serialize, de::DeserializeOwned};
use std::{fmt, fs::File, io::BufReader, path::Path, str::FromStr};
use tracing::{info, instrument, warn};

/// The tables that can be exported and imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// `clients`
    Clients,
    /// `products`
    Products,
    /// `orders`
    Orders,
    /// `order_items`
    OrderItems,
}

impl Table {
    /// Every managed table.
    pub const ALL: [Self; 4] = [Self::Clients, Self::Products, Self::Orders, Self::OrderItems];

    /// Table name as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Products => "products",
            Self::Orders => "orders",
            Self::OrderItems => "order_items",
        }
    }

    /// Column names in definition order.
    #[must_use]
    pub fn columns(self) -> Vec<String> {
        match self {
            Self::Clients => column_names::<Client>(),
            Self::Products => column_names::<Product>(),
            Self::Orders => column_names::<Order>(),
            Self::OrderItems => column_names::<OrderItem>(),
        }
    }
}

fn column_names<E: EntityTrait>() -> Vec<String> {
    E::Column::iter()
        .map(|column| IdenStatic::as_str(&column).to_owned())
        .collect()
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|table| table.as_str() == name)
            .ok_or_else(|| Error::UnknownTable {
                name: name.to_string(),
            })
    }
}

/// Outcome of a record-by-record JSON import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records stored
    pub imported: usize,
    /// Records logged and skipped
    pub skipped: usize,
}

/// Writes every row of `table` to a CSV file with a header row; returns the row count.
///
/// # Errors
/// Returns an I/O or CSV error if the file cannot be written.
#[instrument(skip(db, path), fields(path = %path.as_ref().display()))]
pub async fn export_csv<P: AsRef<Path>>(db: &DatabaseConnection, table: Table, path: P) -> Result<usize> {
    let path = path.as_ref();
    let count = match table {
        Table::Clients => write_csv(path, table, &Client::find().all(db).await?)?,
        Table::Products => write_csv(path, table, &Product::find().all(db).await?)?,
        Table::Orders => write_csv(path, table, &Order::find().all(db).await?)?,
        Table::OrderItems => write_csv(path, table, &OrderItem::find().all(db).await?)?,
    };
    info!("Exported {} rows of {} to CSV", count, table);
    Ok(count)
}

fn write_csv<T: Serialize>(path: &Path, table: Table, rows: &[T]) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(table.columns())?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(rows.len())
}

/// Writes every row of `table` to a pretty-printed JSON array; returns the row count.
///
/// # Errors
/// Returns an I/O or JSON error if the file cannot be written.
#[instrument(skip(db, path), fields(path = %path.as_ref().display()))]
pub async fn export_json<P: AsRef<Path>>(db: &DatabaseConnection, table: Table, path: P) -> Result<usize> {
    let path = path.as_ref();
    let count = match table {
        Table::Clients => write_json(path, &Client::find().all(db).await?)?,
        Table::Products => write_json(path, &Product::find().all(db).await?)?,
        Table::Orders => write_json(path, &Order::find().all(db).await?)?,
        Table::OrderItems => write_json(path, &OrderItem::find().all(db).await?)?,
    };
    info!("Exported {} rows of {} to JSON", count, table);
    Ok(count)
}

fn write_json<T: Serialize>(path: &Path, rows: &[T]) -> Result<usize> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    rows.serialize(&mut serializer)?;
    std::fs::write(path, out)?;
    Ok(rows.len())
}

/// Inserts every data row of a CSV file into `table`; returns the row count.
///
/// The first row is a header and is discarded. Values are matched to columns by position
/// and stored without validation. Order lines are keyed by order and product, so a file
/// listing the same product twice for one order is refused as a duplicate.
///
/// # Errors
/// Any unreadable row, a header or row whose width differs from the table's column count
/// (`Error::ColumnCount`) or a refused insert fails the whole import and leaves the table
/// unchanged.
#[instrument(skip(db, path), fields(path = %path.as_ref().display()))]
pub async fn import_csv<P: AsRef<Path>>(db: &DatabaseConnection, table: Table, path: P) -> Result<usize> {
    let path = path.as_ref();
    let txn = db.begin().await?;
    let count = match table {
        Table::Clients => insert_rows::<client::ActiveModel, _>(&txn, read_csv(path, table)?).await?,
        Table::Products => insert_rows::<product::ActiveModel, _>(&txn, read_csv(path, table)?).await?,
        Table::Orders => insert_rows::<order::ActiveModel, _>(&txn, read_csv(path, table)?).await?,
        Table::OrderItems => insert_rows::<order_item::ActiveModel, _>(&txn, read_csv(path, table)?).await?,
    };
    txn.commit().await?;
    info!("Imported {} rows into {} from CSV", count, table);
    Ok(count)
}

fn read_csv<T: DeserializeOwned>(path: &Path, table: Table) -> Result<Vec<T>> {
    let expected = table.columns().len();
    let check_width = |found: usize| {
        if found == expected {
            Ok(())
        } else {
            Err(Error::ColumnCount {
                table: table.as_str(),
                expected,
                found,
            })
        }
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut records = reader.records();
    let mut rows = Vec::new();
    let Some(header) = records.next().transpose()? else {
        return Ok(rows);
    };
    check_width(header.len())?;

    for record in records {
        let record = record?;
        check_width(record.len())?;
        rows.push(record.deserialize(None)?);
    }
    Ok(rows)
}

async fn insert_rows<A, C>(conn: &C, rows: Vec<<A::Entity as EntityTrait>::Model>) -> Result<usize>
where
    A: ActiveModelTrait,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
{
    let count = rows.len();
    for row in rows {
        A::Entity::insert(row.into_active_model())
            .exec_without_returning(conn)
            .await?;
    }
    Ok(count)
}

/// Imports clients from a JSON array of `{name, email, phone, city, address}` objects.
///
/// Identifiers continue the client sequence, one number per record in file order, so a
/// skipped record leaves a gap.
///
/// # Errors
/// Only an unreadable file, a document that is not a JSON array or an exhausted
/// identifier sequence fails the import.
#[instrument(skip(db, ids, path), fields(path = %path.as_ref().display()))]
pub async fn import_clients_json<P: AsRef<Path>>(
    db: &DatabaseConnection,
    ids: &IdScheme,
    path: P,
) -> Result<ImportSummary> {
    let records = read_json_array(path.as_ref())?;
    let base = current_sequence(db, ids, IdKind::Client).await?;

    let mut summary = ImportSummary::default();
    for (n, record) in (1..).zip(records) {
        let id = imported_id(ids, IdKind::Client, base, n)?;
        let outcome = match serde_json::from_value::<ClientDraft>(record) {
            Ok(draft) => store_client(db, draft.into_model(id.clone())).await,
            Err(e) => Err(e.into()),
        };
        tally(&mut summary, "client", n, &id, outcome);
    }
    info!(
        "Client JSON import finished: {} imported, {} skipped",
        summary.imported, summary.skipped
    );
    Ok(summary)
}

async fn store_client(db: &DatabaseConnection, client: ClientModel) -> Result<()> {
    client.validate_all()?;
    add_client(db, &client).await
}

/// Imports products from a JSON array of `{name, price}` objects.
///
/// `price` may be a number or numeric text. Identifiers continue the product sequence.
///
/// # Errors
/// Only an unreadable file, a document that is not a JSON array or an exhausted
/// identifier sequence fails the import.
#[instrument(skip(db, ids, path), fields(path = %path.as_ref().display()))]
pub async fn import_products_json<P: AsRef<Path>>(
    db: &DatabaseConnection,
    ids: &IdScheme,
    path: P,
) -> Result<ImportSummary> {
    let records = read_json_array(path.as_ref())?;
    let base = current_sequence(db, ids, IdKind::Product).await?;

    let mut summary = ImportSummary::default();
    for (n, record) in (1..).zip(records) {
        let id = imported_id(ids, IdKind::Product, base, n)?;
        let outcome = match serde_json::from_value::<ProductDraft>(record) {
            Ok(draft) => store_product(db, draft, id.clone()).await,
            Err(e) => Err(e.into()),
        };
        tally(&mut summary, "product", n, &id, outcome);
    }
    info!(
        "Product JSON import finished: {} imported, {} skipped",
        summary.imported, summary.skipped
    );
    Ok(summary)
}

async fn store_product(db: &DatabaseConnection, draft: ProductDraft, id: String) -> Result<()> {
    let product = draft.into_model(id)?;
    product.validate_all()?;
    add_product(db, &product).await
}

fn imported_id(ids: &IdScheme, kind: IdKind, base: u64, n: u64) -> Result<String> {
    base.checked_add(n)
        .map(|seq| ids.format(kind, seq))
        .ok_or(Error::SequenceExhausted { table: kind.table() })
}

fn read_json_array(path: &Path) -> Result<Vec<serde_json::Value>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn tally(summary: &mut ImportSummary, entity: &str, position: u64, id: &str, outcome: Result<()>) {
    match outcome {
        Ok(()) => summary.imported += 1,
        Err(e) => {
            warn!("Skipping {} record #{} ({}): {}", entity, position, id, e);
            summary.skipped += 1;
        }
    }
}
