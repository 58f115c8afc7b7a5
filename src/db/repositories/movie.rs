use crate::entities::{movies, prelude::*};
use crate::models::movie::MovieRecord;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, Set};

pub struct MovieRepository {
    conn: DatabaseConnection,
}

impl MovieRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: movies::Model) -> MovieRecord {
        MovieRecord {
            external_id: model.external_id,
            title: model.title,
            release_year: model.release_year,
            director: model.director,
            plot: model.plot,
            poster_url: model.poster_url,
        }
    }

    /// Inserts the record or overwrites every column of the existing row.
    pub async fn upsert(&self, record: &MovieRecord) -> Result<(), DbErr> {
        let active_model = movies::ActiveModel {
            external_id: Set(record.external_id.clone()),
            title: Set(record.title.clone()),
            release_year: Set(record.release_year.clone()),
            director: Set(record.director.clone()),
            plot: Set(record.plot.clone()),
            poster_url: Set(record.poster_url.clone()),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        Movies::insert(active_model)
            .on_conflict(
                OnConflict::column(movies::Column::ExternalId)
                    .update_columns([
                        movies::Column::Title,
                        movies::Column::ReleaseYear,
                        movies::Column::Director,
                        movies::Column::Plot,
                        movies::Column::PosterUrl,
                        movies::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn get(&self, external_id: &str) -> Result<Option<MovieRecord>, DbErr> {
        let row = Movies::find_by_id(external_id.to_string())
            .one(&self.conn)
            .await?;
        Ok(row.map(Self::map_model))
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        Movies::find().count(&self.conn).await
    }
}
