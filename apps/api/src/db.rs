use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Upper bound on ids per `= ANY($1)` batch read.
pub const FETCH_BATCH_SIZE: usize = 30;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Applies `migrations/` on startup.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Splits ids into `FETCH_BATCH_SIZE` chunks, dropping duplicates but keeping first-seen order.
pub fn id_batches<T: Clone + PartialEq>(ids: &[T]) -> Vec<Vec<T>> {
    let mut unique: Vec<T> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(id.clone());
        }
    }
    unique
        .chunks(FETCH_BATCH_SIZE)
        .map(|chunk| chunk.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_batches_empty() {
        let batches: Vec<Vec<u32>> = id_batches(&[]);
        assert!(batches.is_empty());
    }

    #[test]
    fn test_id_batches_chunks_at_thirty() {
        let ids: Vec<u32> = (0..65).collect();
        let batches = id_batches(&ids);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 30);
        assert_eq!(batches[1].len(), 30);
        assert_eq!(batches[2].len(), 5);
        assert_eq!(batches[2][0], 60);
    }

    #[test]
    fn test_id_batches_deduplicates() {
        let batches = id_batches(&[1, 2, 1, 3, 2]);
        assert_eq!(batches, vec![vec![1, 2, 3]]);
    }
}
