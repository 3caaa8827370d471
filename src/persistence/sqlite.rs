use super::{PersistenceError, PersistenceResult, PlanStore};
use crate::metadata::PlanMetadata;
use crate::milestone::Milestone;
use crate::plan::TimelinePlan;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;

pub struct SqlitePlanStore {
    connection: Mutex<Connection>,
}

impl SqlitePlanStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS plan_metadata (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                metadata_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS milestones (
                position INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                duration_business_days INTEGER NOT NULL,
                notes TEXT NOT NULL DEFAULT ''
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_metadata(
        &self,
        tx: &rusqlite::Transaction,
        metadata: &PlanMetadata,
    ) -> PersistenceResult<()> {
        let json = serde_json::to_string(metadata)?;
        tx.execute("DELETE FROM plan_metadata", [])?;
        tx.execute(
            "INSERT INTO plan_metadata (id, metadata_json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    fn save_milestones(
        &self,
        tx: &rusqlite::Transaction,
        milestones: &[Milestone],
    ) -> PersistenceResult<()> {
        tx.execute("DELETE FROM milestones", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO milestones (position, name, duration_business_days, notes) \
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (position, milestone) in milestones.iter().enumerate() {
            stmt.execute(params![
                position as i64,
                milestone.name,
                milestone.duration_business_days,
                milestone.notes
            ])?;
        }
        Ok(())
    }
}

impl PlanStore for SqlitePlanStore {
    fn save_plan(&self, plan: &TimelinePlan) -> PersistenceResult<()> {
        super::validate_plan(plan)?;
        let mut conn = self
            .connection
            .lock()
            .map_err(|_| PersistenceError::LockPoisoned)?;
        let tx = conn.transaction()?;
        self.save_metadata(&tx, &plan.metadata)?;
        self.save_milestones(&tx, &plan.milestones)?;
        tx.commit()?;
        Ok(())
    }

    fn load_plan(&self) -> PersistenceResult<Option<TimelinePlan>> {
        let conn = self
            .connection
            .lock()
            .map_err(|_| PersistenceError::LockPoisoned)?;

        let mut stmt = conn.prepare("SELECT metadata_json FROM plan_metadata WHERE id = 1")?;
        let metadata_json_opt: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;

        let Some(metadata_json) = metadata_json_opt else {
            return Ok(None);
        };

        let metadata: PlanMetadata = serde_json::from_str(&metadata_json)?;

        let mut stmt = conn.prepare(
            "SELECT name, duration_business_days, notes FROM milestones ORDER BY position ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Milestone::new(row.get::<_, String>(0)?, row.get::<_, i64>(1)?)
                .with_notes(row.get::<_, String>(2)?))
        })?;

        let mut milestones = Vec::new();
        for milestone in rows {
            milestones.push(milestone?);
        }

        let plan = TimelinePlan::with_milestones(metadata, milestones);
        super::validate_plan(&plan)?;
        Ok(Some(plan))
    }
}
