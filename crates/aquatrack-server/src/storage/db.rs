//! SQLite database layer (embedded, no external dependencies)

use anyhow::{Context, Result};
use aquatrack_types::{
    FishSpecies, FishWithSpecies, PlantSpecies, PlantWithSpecies, Tank, User, UserFish, UserPlant,
    WaterParams,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, SqlitePool};
use std::sync::Arc;

pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    pub async fn new(database_path: &str) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path);

        if let Some(parent) = std::path::Path::new(database_path).parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        tracing::info!("SQLite connection established, running migrations...");

        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        tracing::info!("Database initialization complete");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Private in-memory database, used by service tests.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new().filename(":memory:");

        // A single connection keeps the in-memory database alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory SQLite database")?;

        Self::run_migrations(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                name TEXT,
                password_hash TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tanks (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                image TEXT,
                ammonia REAL,
                nitrate REAL,
                nitrite REAL,
                hardness REAL,
                chlorine REAL,
                alkalinity REAL,
                ph REAL,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL,
                maintained_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS fish_species (
                id TEXT PRIMARY KEY,
                species TEXT NOT NULL,
                habitat TEXT NOT NULL DEFAULT '',
                diet TEXT NOT NULL DEFAULT '',
                tank_sizes TEXT NOT NULL DEFAULT '',
                tank_friends TEXT NOT NULL DEFAULT '',
                illnesses TEXT NOT NULL DEFAULT '',
                image_url TEXT
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS plant_species (
                id TEXT PRIMARY KEY,
                species TEXT NOT NULL,
                lighting TEXT NOT NULL DEFAULT '',
                soil TEXT NOT NULL DEFAULT '',
                illnesses TEXT NOT NULL DEFAULT '',
                image_url TEXT
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_fish (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                tank_id TEXT NOT NULL,
                species_id TEXT NOT NULL,
                name TEXT NOT NULL,
                image_url TEXT,
                next_update DATETIME NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_plants (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                tank_id TEXT NOT NULL,
                species_id TEXT NOT NULL,
                name TEXT NOT NULL,
                image_url TEXT,
                maintained_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    // User operations

    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: Option<&str>,
    ) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&id)
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .execute(&*self.pool)
        .await?;

        Ok(id)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<(String, String)>> {
        let row: Option<(String, String)> = sqlx::query_as(
            r#"
            SELECT id, password_hash FROM users WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, email, name, created_at FROM users WHERE id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    // Tank operations

    pub async fn create_tank(&self, tank: &Tank) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tanks (id, user_id, name, image,
                               ammonia, nitrate, nitrite, hardness, chlorine, alkalinity, ph,
                               created_at, updated_at, maintained_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&tank.id)
        .bind(&tank.user_id)
        .bind(&tank.name)
        .bind(&tank.image)
        .bind(tank.water.ammonia)
        .bind(tank.water.nitrate)
        .bind(tank.water.nitrite)
        .bind(tank.water.hardness)
        .bind(tank.water.chlorine)
        .bind(tank.water.alkalinity)
        .bind(tank.water.ph)
        .bind(tank.created_at)
        .bind(tank.updated_at)
        .bind(tank.maintained_at)
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_tank(&self, id: &str) -> Result<Option<Tank>> {
        let row: Option<TankRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, name, image,
                   ammonia, nitrate, nitrite, hardness, chlorine, alkalinity, ph,
                   created_at, updated_at, maintained_at
            FROM tanks WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    pub async fn list_tanks_by_user(&self, user_id: &str) -> Result<Vec<Tank>> {
        let rows: Vec<TankRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, name, image,
                   ammonia, nitrate, nitrite, hardness, chlorine, alkalinity, ph,
                   created_at, updated_at, maintained_at
            FROM tanks WHERE user_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Partial update: absent fields keep their stored values. Refreshes the
    /// updated/maintained timestamps. Returns the number of rows touched.
    pub async fn update_tank(
        &self,
        id: &str,
        name: Option<&str>,
        image: Option<&str>,
        water: &WaterParams,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE tanks SET
                name = COALESCE(?1, name),
                image = COALESCE(?2, image),
                ammonia = COALESCE(?3, ammonia),
                nitrate = COALESCE(?4, nitrate),
                nitrite = COALESCE(?5, nitrite),
                hardness = COALESCE(?6, hardness),
                chlorine = COALESCE(?7, chlorine),
                alkalinity = COALESCE(?8, alkalinity),
                ph = COALESCE(?9, ph),
                updated_at = ?10,
                maintained_at = ?10
            WHERE id = ?11
            "#,
        )
        .bind(name)
        .bind(image)
        .bind(water.ammonia)
        .bind(water.nitrate)
        .bind(water.nitrite)
        .bind(water.hardness)
        .bind(water.chlorine)
        .bind(water.alkalinity)
        .bind(water.ph)
        .bind(now)
        .bind(id)
        .execute(&*self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_tank(&self, id: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM tanks WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&*self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // Species catalog operations

    pub async fn create_fish_species(&self, species: &FishSpecies) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO fish_species (id, species, habitat, diet, tank_sizes,
                                      tank_friends, illnesses, image_url)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&species.id)
        .bind(&species.species)
        .bind(&species.habitat)
        .bind(&species.diet)
        .bind(&species.tank_sizes)
        .bind(&species.tank_friends)
        .bind(&species.illnesses)
        .bind(&species.image_url)
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_fish_species(&self) -> Result<Vec<FishSpecies>> {
        let rows: Vec<FishSpeciesRow> = sqlx::query_as(
            r#"
            SELECT id, species, habitat, diet, tank_sizes, tank_friends, illnesses, image_url
            FROM fish_species ORDER BY species
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    pub async fn create_plant_species(&self, species: &PlantSpecies) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO plant_species (id, species, lighting, soil, illnesses, image_url)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&species.id)
        .bind(&species.species)
        .bind(&species.lighting)
        .bind(&species.soil)
        .bind(&species.illnesses)
        .bind(&species.image_url)
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_plant_species(&self) -> Result<Vec<PlantSpecies>> {
        let rows: Vec<PlantSpeciesRow> = sqlx::query_as(
            r#"
            SELECT id, species, lighting, soil, illnesses, image_url
            FROM plant_species ORDER BY species
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    // Fish operations

    pub async fn insert_fish(&self, fish: &[UserFish]) -> Result<()> {
        for f in fish {
            sqlx::query(
                r#"
                INSERT INTO user_fish (id, user_id, tank_id, species_id, name, image_url, next_update)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&f.id)
            .bind(&f.user_id)
            .bind(&f.tank_id)
            .bind(&f.species_id)
            .bind(&f.name)
            .bind(&f.image_url)
            .bind(f.next_update)
            .execute(&*self.pool)
            .await?;
        }

        Ok(())
    }

    pub async fn get_fish(&self, id: &str) -> Result<Option<UserFish>> {
        let row: Option<UserFishRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, tank_id, species_id, name, image_url, next_update
            FROM user_fish WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    pub async fn list_fish_by_user(&self, user_id: &str) -> Result<Vec<UserFish>> {
        let rows: Vec<UserFishRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, tank_id, species_id, name, image_url, next_update
            FROM user_fish WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Tank read path: each fish with its catalog species name attached.
    pub async fn list_fish_by_tank(&self, tank_id: &str) -> Result<Vec<FishWithSpecies>> {
        let rows: Vec<FishJoinRow> = sqlx::query_as(
            r#"
            SELECT f.id, f.user_id, f.tank_id, f.species_id, f.name, f.image_url,
                   f.next_update, s.species
            FROM user_fish f
            LEFT JOIN fish_species s ON s.id = f.species_id
            WHERE f.tank_id = ?1
            "#,
        )
        .bind(tank_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Rename and/or reschedule a fish. Returns the number of rows touched.
    pub async fn update_fish(
        &self,
        id: &str,
        name: Option<&str>,
        next_update: Option<DateTime<Utc>>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE user_fish SET
                name = COALESCE(?1, name),
                next_update = COALESCE(?2, next_update)
            WHERE id = ?3
            "#,
        )
        .bind(name)
        .bind(next_update)
        .bind(id)
        .execute(&*self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_fish(&self, id: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_fish WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&*self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_fish_many(&self, ids: &[String]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::new("DELETE FROM user_fish WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let result = builder.build().execute(&*self.pool).await?;

        Ok(result.rows_affected())
    }

    // Plant operations

    pub async fn insert_plants(&self, plants: &[UserPlant]) -> Result<()> {
        for p in plants {
            sqlx::query(
                r#"
                INSERT INTO user_plants (id, user_id, tank_id, species_id, name, image_url, maintained_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&p.id)
            .bind(&p.user_id)
            .bind(&p.tank_id)
            .bind(&p.species_id)
            .bind(&p.name)
            .bind(&p.image_url)
            .bind(p.maintained_at)
            .execute(&*self.pool)
            .await?;
        }

        Ok(())
    }

    pub async fn get_plant(&self, id: &str) -> Result<Option<UserPlant>> {
        let row: Option<UserPlantRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, tank_id, species_id, name, image_url, maintained_at
            FROM user_plants WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    pub async fn list_plants_by_user(&self, user_id: &str) -> Result<Vec<UserPlant>> {
        let rows: Vec<UserPlantRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, tank_id, species_id, name, image_url, maintained_at
            FROM user_plants WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    pub async fn list_plants_by_tank(&self, tank_id: &str) -> Result<Vec<PlantWithSpecies>> {
        let rows: Vec<PlantJoinRow> = sqlx::query_as(
            r#"
            SELECT p.id, p.user_id, p.tank_id, p.species_id, p.name, p.image_url,
                   p.maintained_at, s.species
            FROM user_plants p
            LEFT JOIN plant_species s ON s.id = p.species_id
            WHERE p.tank_id = ?1
            "#,
        )
        .bind(tank_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Rename and/or re-anchor a plant's maintenance time. Returns the
    /// number of rows touched.
    pub async fn update_plant(
        &self,
        id: &str,
        name: Option<&str>,
        image_url: Option<&str>,
        maintained_at: Option<DateTime<Utc>>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE user_plants SET
                name = COALESCE(?1, name),
                image_url = COALESCE(?2, image_url),
                maintained_at = COALESCE(?3, maintained_at)
            WHERE id = ?4
            "#,
        )
        .bind(name)
        .bind(image_url)
        .bind(maintained_at)
        .bind(id)
        .execute(&*self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_plant(&self, id: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_plants WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&*self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_plants_many(&self, ids: &[String]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::new("DELETE FROM user_plants WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let result = builder.build().execute(&*self.pool).await?;

        Ok(result.rows_affected())
    }
}

// Helper structs for sqlx query_as

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    name: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            email: r.email,
            name: r.name,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TankRow {
    id: String,
    user_id: String,
    name: String,
    image: Option<String>,
    ammonia: Option<f64>,
    nitrate: Option<f64>,
    nitrite: Option<f64>,
    hardness: Option<f64>,
    chlorine: Option<f64>,
    alkalinity: Option<f64>,
    ph: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    maintained_at: DateTime<Utc>,
}

impl From<TankRow> for Tank {
    fn from(r: TankRow) -> Self {
        Tank {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            image: r.image,
            water: WaterParams {
                ammonia: r.ammonia,
                nitrate: r.nitrate,
                nitrite: r.nitrite,
                hardness: r.hardness,
                chlorine: r.chlorine,
                alkalinity: r.alkalinity,
                ph: r.ph,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
            maintained_at: r.maintained_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FishSpeciesRow {
    id: String,
    species: String,
    habitat: String,
    diet: String,
    tank_sizes: String,
    tank_friends: String,
    illnesses: String,
    image_url: Option<String>,
}

impl From<FishSpeciesRow> for FishSpecies {
    fn from(r: FishSpeciesRow) -> Self {
        FishSpecies {
            id: r.id,
            species: r.species,
            habitat: r.habitat,
            diet: r.diet,
            tank_sizes: r.tank_sizes,
            tank_friends: r.tank_friends,
            illnesses: r.illnesses,
            image_url: r.image_url,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PlantSpeciesRow {
    id: String,
    species: String,
    lighting: String,
    soil: String,
    illnesses: String,
    image_url: Option<String>,
}

impl From<PlantSpeciesRow> for PlantSpecies {
    fn from(r: PlantSpeciesRow) -> Self {
        PlantSpecies {
            id: r.id,
            species: r.species,
            lighting: r.lighting,
            soil: r.soil,
            illnesses: r.illnesses,
            image_url: r.image_url,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserFishRow {
    id: String,
    user_id: String,
    tank_id: String,
    species_id: String,
    name: String,
    image_url: Option<String>,
    next_update: DateTime<Utc>,
}

impl From<UserFishRow> for UserFish {
    fn from(r: UserFishRow) -> Self {
        UserFish {
            id: r.id,
            user_id: r.user_id,
            tank_id: r.tank_id,
            species_id: r.species_id,
            name: r.name,
            image_url: r.image_url,
            next_update: r.next_update,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FishJoinRow {
    id: String,
    user_id: String,
    tank_id: String,
    species_id: String,
    name: String,
    image_url: Option<String>,
    next_update: DateTime<Utc>,
    species: Option<String>,
}

impl From<FishJoinRow> for FishWithSpecies {
    fn from(r: FishJoinRow) -> Self {
        FishWithSpecies {
            fish: UserFish {
                id: r.id,
                user_id: r.user_id,
                tank_id: r.tank_id,
                species_id: r.species_id,
                name: r.name,
                image_url: r.image_url,
                next_update: r.next_update,
            },
            species: r.species,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserPlantRow {
    id: String,
    user_id: String,
    tank_id: String,
    species_id: String,
    name: String,
    image_url: Option<String>,
    maintained_at: DateTime<Utc>,
}

impl From<UserPlantRow> for UserPlant {
    fn from(r: UserPlantRow) -> Self {
        UserPlant {
            id: r.id,
            user_id: r.user_id,
            tank_id: r.tank_id,
            species_id: r.species_id,
            name: r.name,
            image_url: r.image_url,
            maintained_at: r.maintained_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PlantJoinRow {
    id: String,
    user_id: String,
    tank_id: String,
    species_id: String,
    name: String,
    image_url: Option<String>,
    maintained_at: DateTime<Utc>,
    species: Option<String>,
}

impl From<PlantJoinRow> for PlantWithSpecies {
    fn from(r: PlantJoinRow) -> Self {
        PlantWithSpecies {
            plant: UserPlant {
                id: r.id,
                user_id: r.user_id,
                tank_id: r.tank_id,
                species_id: r.species_id,
                name: r.name,
                image_url: r.image_url,
                maintained_at: r.maintained_at,
            },
            species: r.species,
        }
    }
}
