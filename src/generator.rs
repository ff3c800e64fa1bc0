use anyhow::anyhow;
use jiff::Timestamp;
use rand::{Rng, seq::SliceRandom};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set, TransactionTrait,
    sea_query::OnConflict,
};
use tracing::info;

use crate::{
    entities::{genre, movie, rating, user},
    error::AppResult,
};

const TITLE_PREFIXES: &[&str] = &[
    "The", "A", "An", "Last", "First", "Final", "Ultimate", "Secret", "Hidden", "Lost",
    "Forgotten", "Ancient", "Modern", "Future", "Past",
];

const TITLE_SUBJECTS: &[&str] = &[
    "King", "Queen", "Warrior", "Knight", "Dragon", "Phoenix", "Shadow", "Light", "Dark", "Storm",
    "Fire", "Ice", "Wind", "Earth", "Star", "Moon", "Sun", "Ocean", "Mountain", "Forest", "Desert",
    "City", "Love", "War", "Peace", "Journey", "Quest", "Adventure", "Mystery", "Legend", "Hero",
    "Villain", "Angel", "Demon", "Spirit",
];

const TITLE_SUFFIXES: &[&str] = &[
    "Rising", "Falls", "Returns", "Begins", "Ends", "Chronicles", "Legacy", "Origins", "Destiny",
    "Prophecy", "Awakening", "Reborn", "Revolution", "Redemption", "Revenge", "Resurrection",
    "Revelation",
];

const HINDI_WORDS: &[&str] = &[
    "Pyaar", "Ishq", "Mohabbat", "Dil", "Dilwale", "Deewana", "Raja", "Rani", "Khiladi", "Hero",
    "Dosti", "Yaari", "Zindagi", "Kahani", "Sapna", "Armaan", "Khushi", "Gham", "Judaai", "Milan",
    "Sangam", "Bandhan", "Rishta", "Saathi", "Humsafar", "Raaz", "Bhoot", "Aatma",
];

const DIRECTORS: &[&str] = &[
    "Steven Spielberg", "Christopher Nolan", "Martin Scorsese", "Quentin Tarantino",
    "James Cameron", "Ridley Scott", "David Fincher", "Coen Brothers", "Wes Anderson",
    "Paul Thomas Anderson", "Denis Villeneuve", "Damien Chazelle", "Rajkumar Hirani",
    "Karan Johar", "Sanjay Leela Bhansali", "Anurag Kashyap", "Imtiaz Ali", "Rohit Shetty",
    "Zoya Akhtar", "Vishal Bhardwaj", "S.S. Rajamouli", "Mani Ratnam", "Shankar",
    "Gautham Menon", "Trivikram Srinivas", "Sukumar", "Lokesh Kanagaraj", "Atlee",
];

const DESCRIPTIONS: &[&str] = &[
    "A thrilling adventure that will keep you on the edge of your seat",
    "An emotional journey of love, loss, and redemption",
    "A masterpiece of cinema that transcends genres",
    "A visual spectacle with stunning cinematography",
    "A thought-provoking drama that questions society",
    "An action-packed thriller with unexpected twists",
    "A heartwarming story of friendship and courage",
    "A dark psychological thriller that explores human nature",
    "A romantic tale that spans generations",
    "An epic saga of power, betrayal, and revenge",
];

const POSITIVE_REVIEWS: &[&str] = &[
    "Amazing movie! Must watch!",
    "Brilliant performance by the cast",
    "Exceeded my expectations",
    "A masterpiece!",
    "Loved every moment of it",
    "Outstanding direction and cinematography",
    "One of the best movies I've seen",
    "Highly recommended!",
    "A cinematic gem",
    "Perfect in every way",
];

const NEUTRAL_REVIEWS: &[&str] = &[
    "Good movie, worth watching",
    "Decent entertainment",
    "Has its moments",
    "Not bad, could be better",
    "Average but enjoyable",
    "Good for a one-time watch",
    "Fairly entertaining",
    "Okay movie",
    "Nothing special but watchable",
    "Mixed feelings about this one",
];

const NEGATIVE_REVIEWS: &[&str] = &[
    "Disappointing",
    "Not worth the time",
    "Could have been much better",
    "Waste of talent",
    "Poor execution",
    "Boring and predictable",
    "Expected more",
    "Not recommended",
    "Failed to impress",
    "Below average",
];

const FIRST_NAMES: &[&str] = &[
    "John", "Jane", "Mike", "Sarah", "David", "Emma", "Raj", "Priya", "Amit", "Neha", "Rahul",
    "Anjali",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Kumar", "Sharma", "Patel", "Singh", "Gupta",
];

const RATING_SPREAD_DAYS: i64 = 90;
const REVIEW_PROBABILITY: f64 = 0.7;

pub struct Generator<R> {
    rng: R,
    now: Timestamp,
    batch_size: usize,
}

impl<R: Rng> Generator<R> {
    pub fn new(rng: R, now: Timestamp, batch_size: usize) -> Self {
        Self { rng, now, batch_size: batch_size.max(1) }
    }

    pub async fn users(&mut self, db: &DatabaseConnection, count: usize) -> AppResult<u64> {
        let mut written = 0;
        for chunk in batches(count, self.batch_size) {
            let rows: Vec<user::ActiveModel> = (0..chunk).map(|_| self.random_user()).collect();
            written += commit_batch(
                db,
                rows,
                Some(OnConflict::column(user::Column::Username).do_nothing().to_owned()),
            )
            .await?;
            info!(written, requested = count, "users generated");
        }
        Ok(written)
    }

    pub async fn movies(&mut self, db: &DatabaseConnection, count: usize) -> AppResult<u64> {
        let genres: Vec<i32> =
            genre::Entity::find().all(db).await?.into_iter().map(|g| g.id).collect();
        if genres.is_empty() {
            return Err(anyhow!("no genres in catalogue; run migrations first").into());
        }

        let mut written = 0;
        for chunk in batches(count, self.batch_size) {
            let rows: Vec<movie::ActiveModel> =
                (0..chunk).map(|_| self.random_movie(&genres)).collect();
            written += commit_batch(db, rows, None).await?;
            info!(written, requested = count, "movies generated");
        }
        Ok(written)
    }

    pub async fn ratings(&mut self, db: &DatabaseConnection, count: usize) -> AppResult<u64> {
        let users: Vec<i32> =
            user::Entity::find().all(db).await?.into_iter().map(|u| u.id).collect();
        let movies: Vec<i32> =
            movie::Entity::find().all(db).await?.into_iter().map(|m| m.id).collect();
        if users.is_empty() || movies.is_empty() {
            return Err(anyhow!("ratings need at least one user and one movie").into());
        }

        let mut written = 0;
        for chunk in batches(count, self.batch_size) {
            let rows: Vec<rating::ActiveModel> =
                (0..chunk).map(|_| self.random_rating(&users, &movies)).collect();
            written += commit_batch(
                db,
                rows,
                Some(
                    OnConflict::columns([rating::Column::UserId, rating::Column::MovieId])
                        .do_nothing()
                        .to_owned(),
                ),
            )
            .await?;
            info!(written, requested = count, "ratings generated");
        }
        Ok(written)
    }

    fn random_user(&mut self) -> user::ActiveModel {
        let first = pick(&mut self.rng, FIRST_NAMES);
        let last = pick(&mut self.rng, LAST_NAMES);
        let suffix: u32 = self.rng.gen_range(0..1000);
        user::ActiveModel {
            id: Default::default(),
            username: Set(format!("{}{}{suffix}", first.to_lowercase(), last.to_lowercase())),
            created_at: Set(self.now.as_second()),
        }
    }

    fn random_movie(&mut self, genres: &[i32]) -> movie::ActiveModel {
        let title = if self.rng.gen_bool(0.7) { self.english_title() } else { self.hindi_title() };
        let genre_id = genres.choose(&mut self.rng).copied().unwrap_or(genres[0]);
        movie::ActiveModel {
            id: Default::default(),
            tmdb_id: Set(None),
            title: Set(title),
            release_year: Set(Some(self.rng.gen_range(1950..=2024))),
            genre_id: Set(genre_id),
            director: Set(Some(pick(&mut self.rng, DIRECTORS).to_string())),
            description: Set(Some(pick(&mut self.rng, DESCRIPTIONS).to_string())),
            created_at: Set(self.now.as_second()),
        }
    }

    fn random_rating(&mut self, users: &[i32], movies: &[i32]) -> rating::ActiveModel {
        let score: i32 = self.rng.gen_range(1..=5);
        let age = self.rng.gen_range(0..RATING_SPREAD_DAYS * 86_400);
        rating::ActiveModel {
            id: Default::default(),
            user_id: Set(*users.choose(&mut self.rng).unwrap_or(&users[0])),
            movie_id: Set(*movies.choose(&mut self.rng).unwrap_or(&movies[0])),
            score: Set(score),
            review_text: Set(self.review(score)),
            rated_at: Set(self.now.as_second() - age),
        }
    }

    fn english_title(&mut self) -> String {
        let mut words = Vec::with_capacity(4);
        if self.rng.gen_bool(0.5) {
            words.push(pick(&mut self.rng, TITLE_PREFIXES).to_string());
        }
        words.push(pick(&mut self.rng, TITLE_SUBJECTS).to_string());
        if self.rng.gen_bool(0.3) {
            words.push(pick(&mut self.rng, TITLE_SUFFIXES).to_string());
        }
        if self.rng.gen_bool(0.2) {
            words.push(self.rng.gen_range(1..=5_u8).to_string());
        }
        words.join(" ")
    }

    fn hindi_title(&mut self) -> String {
        let mut title = pick(&mut self.rng, HINDI_WORDS).to_string();
        if self.rng.gen_bool(0.5) {
            title.push(' ');
            title.push_str(pick(&mut self.rng, HINDI_WORDS));
        }
        if self.rng.gen_bool(0.3) {
            title.push_str(if self.rng.gen_bool(0.5) { " Ki " } else { " Ka " });
            title.push_str(pick(&mut self.rng, HINDI_WORDS));
        }
        title
    }

    fn review(&mut self, score: i32) -> Option<String> {
        if !self.rng.gen_bool(REVIEW_PROBABILITY) {
            return None;
        }
        let pool = match score {
            4.. => POSITIVE_REVIEWS,
            3 => NEUTRAL_REVIEWS,
            _ => NEGATIVE_REVIEWS,
        };
        Some(pick(&mut self.rng, pool).to_string())
    }
}

fn pick<'a, R: Rng>(rng: &mut R, words: &[&'a str]) -> &'a str {
    words.choose(rng).copied().unwrap_or_default()
}

fn batches(total: usize, batch_size: usize) -> impl Iterator<Item = usize> {
    (0..total).step_by(batch_size).map(move |start| batch_size.min(total - start))
}

async fn commit_batch<A>(
    db: &DatabaseConnection,
    rows: Vec<A>,
    on_conflict: Option<OnConflict>,
) -> AppResult<u64>
where
    A: ActiveModelTrait + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    if rows.is_empty() {
        return Ok(0);
    }

    let txn = db.begin().await?;
    let mut insert = <A::Entity as EntityTrait>::insert_many(rows);
    if let Some(on_conflict) = on_conflict {
        insert = insert.on_conflict(on_conflict);
    }
    let written = insert.exec_without_returning(&txn).await?;
    txn.commit().await?;

    Ok(written)
}
