use chrono::{DateTime, SecondsFormat, Utc};
use deadpool_postgres::{Config, Pool, PoolConfig, Runtime};
use shelfwatch_common::catalog::ProductType;
use shelfwatch_common::decay::Conditions;
use shelfwatch_common::product::{Product, ProductId, QuantityUnit};
use shelfwatch_common::reading::{ReadingId, SensorReading};
use tokio_postgres::error::SqlState;
use tokio_postgres::{NoTls, Row};

use super::StoreError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS products (
    id                  TEXT PRIMARY KEY,
    name                TEXT NOT NULL,
    product_type        TEXT NOT NULL,
    batch_number        TEXT NOT NULL,
    quantity            DOUBLE PRECISION NOT NULL,
    unit                TEXT NOT NULL,
    added_date          TEXT NOT NULL,
    current_temperature DOUBLE PRECISION,
    current_humidity    DOUBLE PRECISION
);
CREATE TABLE IF NOT EXISTS sensor_readings (
    id          TEXT PRIMARY KEY,
    product_id  TEXT NOT NULL REFERENCES products (id) ON DELETE CASCADE,
    temperature DOUBLE PRECISION NOT NULL,
    humidity    DOUBLE PRECISION NOT NULL,
    recorded_at TEXT NOT NULL
);
ALTER TABLE sensor_readings
    DROP CONSTRAINT IF EXISTS sensor_readings_product_id_fkey,
    ADD CONSTRAINT sensor_readings_product_id_fkey
        FOREIGN KEY (product_id) REFERENCES products (id) ON DELETE CASCADE;
CREATE INDEX IF NOT EXISTS sensor_readings_product_time
    ON sensor_readings (product_id, recorded_at);
";

const PRODUCT_COLUMNS: &str = "id, name, product_type, batch_number, quantity, unit, \
                               added_date, current_temperature, current_humidity";

const INSERT_PRODUCT: &str = "INSERT INTO products (id, name, product_type, batch_number, \
                              quantity, unit, added_date, current_temperature, current_humidity) \
                              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)";

const INSERT_READING: &str = "INSERT INTO sensor_readings \
                              (id, product_id, temperature, humidity, recorded_at) \
                              VALUES ($1, $2, $3, $4, $5)";

const UPDATE_CONDITION: &str = "UPDATE products SET current_temperature = $2, \
                                current_humidity = $3 WHERE id = $1";

/// Timestamps are stored as fixed-width RFC 3339 text so they sort lexically.
fn encode_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_time(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp '{s}': {e}")))
}

fn product_from_row(row: &Row) -> Result<Product, StoreError> {
    let product_type: String = row.try_get("product_type")?;
    let unit: String = row.try_get("unit")?;
    let added_date: String = row.try_get("added_date")?;
    Ok(Product {
        id: ProductId(row.try_get("id")?),
        name: row.try_get("name")?,
        product_type: product_type
            .parse::<ProductType>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
        batch_number: row.try_get("batch_number")?,
        quantity: row.try_get("quantity")?,
        unit: QuantityUnit::parse(&unit)
            .ok_or_else(|| StoreError::Corrupt(format!("bad unit '{unit}'")))?,
        added_date: decode_time(&added_date)?,
        current_temperature: row.try_get("current_temperature")?,
        current_humidity: row.try_get("current_humidity")?,
    })
}

// Parameter lists for the insert statements, expanded in place so they coerce to
// `&[&(dyn ToSql + Sync)]`.
macro_rules! product_params {
    ($product:expr) => {
        [
            &$product.id.0,
            &$product.name,
            &$product.product_type.as_str(),
            &$product.batch_number,
            &$product.quantity,
            &$product.unit.as_str(),
            &encode_time(&$product.added_date),
            &$product.current_temperature,
            &$product.current_humidity,
        ]
    };
}

macro_rules! reading_params {
    ($reading:expr) => {
        [
            &$reading.id.0,
            &$reading.product_id.0,
            &$reading.temperature,
            &$reading.humidity,
            &encode_time(&$reading.timestamp),
        ]
    };
}

/// A foreign-key violation on a reading insert means the product is gone.
fn reading_error(e: tokio_postgres::Error, reading: &SensorReading) -> StoreError {
    if e.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) {
        StoreError::UnknownProduct(reading.product_id.clone())
    } else {
        StoreError::Postgres(e)
    }
}

fn reading_from_row(row: &Row) -> Result<SensorReading, StoreError> {
    let recorded_at: String = row.try_get("recorded_at")?;
    Ok(SensorReading {
        id: ReadingId(row.try_get("id")?),
        product_id: ProductId(row.try_get("product_id")?),
        temperature: row.try_get("temperature")?,
        humidity: row.try_get("humidity")?,
        timestamp: decode_time(&recorded_at)?,
    })
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    /// Build a connection pool and make sure the schema exists.
    pub async fn connect(database_url: &str, pool_size: usize) -> Result<Self, StoreError> {
        let mut cfg = Config::new();
        cfg.url = Some(database_url.to_string());
        cfg.pool = Some(PoolConfig::new(pool_size));
        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client.batch_execute(SCHEMA).await?;
        Ok(())
    }

    pub async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client
            .execute(INSERT_PRODUCT, &product_params!(product))
            .await?;
        Ok(())
    }

    /// Insert a product and its first reading in one transaction.
    pub async fn insert_product_with_reading(
        &self,
        product: &Product,
        reading: &SensorReading,
    ) -> Result<(), StoreError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        tx.execute(INSERT_PRODUCT, &product_params!(product)).await?;
        tx.execute(INSERT_READING, &reading_params!(reading))
            .await
            .map_err(|e| reading_error(e, reading))?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = client.query_opt(sql.as_str(), &[&id.0]).await?;
        row.as_ref().map(product_from_row).transpose()
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY added_date, id");
        let rows = client.query(sql.as_str(), &[]).await?;
        rows.iter().map(product_from_row).collect()
    }

    /// Readings go with the product through `ON DELETE CASCADE`.
    pub async fn delete_product(&self, id: &ProductId) -> Result<bool, StoreError> {
        let client = self.pool.get().await?;
        let deleted = client
            .execute("DELETE FROM products WHERE id = $1", &[&id.0])
            .await?;
        Ok(deleted > 0)
    }

    pub async fn insert_reading(&self, reading: &SensorReading) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client
            .execute(INSERT_READING, &reading_params!(reading))
            .await
            .map_err(|e| reading_error(e, reading))?;
        Ok(())
    }

    /// Append a reading and make it the product's latest condition, in one transaction.
    pub async fn record_reading(&self, reading: &SensorReading) -> Result<(), StoreError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        tx.execute(INSERT_READING, &reading_params!(reading))
            .await
            .map_err(|e| reading_error(e, reading))?;
        let updated = tx
            .execute(
                UPDATE_CONDITION,
                &[&reading.product_id.0, &reading.temperature, &reading.humidity],
            )
            .await?;
        if updated == 0 {
            return Err(StoreError::UnknownProduct(reading.product_id.clone()));
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn list_readings(
        &self,
        product_id: &ProductId,
        limit: usize,
    ) -> Result<Vec<SensorReading>, StoreError> {
        let client = self.pool.get().await?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = client
            .query(
                "SELECT id, product_id, temperature, humidity, recorded_at \
                 FROM sensor_readings WHERE product_id = $1 \
                 ORDER BY recorded_at DESC, id DESC LIMIT $2",
                &[&product_id.0, &limit],
            )
            .await?;
        rows.iter().map(reading_from_row).collect()
    }

    pub async fn update_product_condition(
        &self,
        id: &ProductId,
        conditions: Conditions,
    ) -> Result<bool, StoreError> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                UPDATE_CONDITION,
                &[&id.0, &conditions.temperature, &conditions.humidity],
            )
            .await?;
        Ok(updated > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_encoding_round_trips_at_micros() {
        let t = DateTime::parse_from_rfc3339("2024-06-01T12:30:45.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        let encoded = encode_time(&t);
        assert_eq!(encoded, "2024-06-01T12:30:45.123456Z");
        assert_eq!(decode_time(&encoded).unwrap(), t);
    }

    #[test]
    fn encoded_times_sort_chronologically() {
        let a = DateTime::parse_from_rfc3339("2024-06-01T09:00:00Z").unwrap().with_timezone(&Utc);
        let b = DateTime::parse_from_rfc3339("2024-06-01T10:00:00.5Z").unwrap().with_timezone(&Utc);
        assert!(encode_time(&a) < encode_time(&b));
    }

    #[test]
    fn bad_timestamp_is_corrupt() {
        assert!(matches!(decode_time("yesterday"), Err(StoreError::Corrupt(_))));
    }
}
