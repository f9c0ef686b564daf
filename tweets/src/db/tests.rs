// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Database tests shared by all implementations.

use crate::db::TweetsTx;
use crate::model::*;
use time::macros::datetime;
use tweets_core::db::{BareTx, Db, DbError};

/// Shorthand to build a valid message for testing purposes.
fn message(text: &str) -> TweetMessage {
    TweetMessage::new(text).unwrap()
}

pub(crate) async fn test_create_and_get<D>(db: D)
where
    D: Db,
    D::Tx: TweetsTx,
{
    let now = datetime!(2023-06-11 20:15:00.123456 UTC);

    let mut tx = db.begin().await.unwrap();
    let tweet = tx.create_tweet(&message("Hello"), now).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!("Hello", tweet.message().as_str());
    assert_eq!(now, tweet.created_at());
    assert_eq!(now, tweet.updated_at());

    let mut tx = db.begin().await.unwrap();
    assert_eq!(tweet, tx.get_tweet(tweet.id()).await.unwrap());
}

pub(crate) async fn test_create_assigns_distinct_ids<D>(db: D)
where
    D: Db,
    D::Tx: TweetsTx,
{
    let now = datetime!(2023-06-11 20:15:00 UTC);

    let mut tx = db.begin().await.unwrap();
    let tweet1 = tx.create_tweet(&message("first"), now).await.unwrap();
    let tweet2 = tx.create_tweet(&message("second"), now).await.unwrap();
    tx.commit().await.unwrap();

    assert_ne!(tweet1.id(), tweet2.id());
}

pub(crate) async fn test_get_tweets<D>(db: D)
where
    D: Db,
    D::Tx: TweetsTx,
{
    let mut tx = db.begin().await.unwrap();
    assert_eq!(Vec::<Tweet>::new(), tx.get_tweets().await.unwrap());

    // Timestamps are deliberately out of order: tweets are sorted by identifier.
    let now1 = datetime!(2023-06-11 20:15:00 UTC);
    let now2 = datetime!(2023-06-10 08:00:00 UTC);
    let now3 = datetime!(2023-06-12 10:30:00 UTC);
    let tweet1 = tx.create_tweet(&message("one"), now1).await.unwrap();
    let tweet2 = tx.create_tweet(&message("two"), now2).await.unwrap();
    let tweet3 = tx.create_tweet(&message("one"), now3).await.unwrap();

    assert_eq!(vec![tweet1, tweet2, tweet3], tx.get_tweets().await.unwrap());
}

pub(crate) async fn test_get_tweet_not_found<D>(db: D)
where
    D: Db,
    D::Tx: TweetsTx,
{
    let now = datetime!(2023-06-11 20:15:00 UTC);

    let mut tx = db.begin().await.unwrap();
    let tweet = tx.create_tweet(&message("exists"), now).await.unwrap();

    let other_id = TweetId::from_i32(tweet.id().as_i32() + 1).unwrap();
    assert_eq!(DbError::NotFound, tx.get_tweet(other_id).await.unwrap_err());
}

pub(crate) async fn test_update_tweet<D>(db: D)
where
    D: Db,
    D::Tx: TweetsTx,
{
    let created = datetime!(2023-06-11 20:15:00 UTC);
    let updated = datetime!(2023-06-12 07:00:00.5 UTC);

    let mut tx = db.begin().await.unwrap();
    let tweet = tx.create_tweet(&message("before"), created).await.unwrap();
    let other = tx.create_tweet(&message("untouched"), created).await.unwrap();

    let new_tweet = tx.update_tweet(tweet.id(), &message("after"), updated).await.unwrap();
    assert_eq!(Tweet::new(tweet.id(), message("after"), created, updated), new_tweet);

    assert_eq!(new_tweet, tx.get_tweet(tweet.id()).await.unwrap());
    assert_eq!(other, tx.get_tweet(other.id()).await.unwrap());
}

pub(crate) async fn test_update_tweet_not_found<D>(db: D)
where
    D: Db,
    D::Tx: TweetsTx,
{
    let now = datetime!(2023-06-11 20:15:00 UTC);

    let mut tx = db.begin().await.unwrap();
    assert_eq!(
        DbError::NotFound,
        tx.update_tweet(TweetId::from_i32(1).unwrap(), &message("x"), now).await.unwrap_err()
    );
    assert_eq!(Vec::<Tweet>::new(), tx.get_tweets().await.unwrap());
}

pub(crate) async fn test_delete_tweet<D>(db: D)
where
    D: Db,
    D::Tx: TweetsTx,
{
    let now = datetime!(2023-06-11 20:15:00 UTC);

    let mut tx = db.begin().await.unwrap();
    let tweet1 = tx.create_tweet(&message("first"), now).await.unwrap();
    let tweet2 = tx.create_tweet(&message("second"), now).await.unwrap();

    tx.delete_tweet(tweet1.id()).await.unwrap();
    assert_eq!(DbError::NotFound, tx.get_tweet(tweet1.id()).await.unwrap_err());
    assert_eq!(DbError::NotFound, tx.delete_tweet(tweet1.id()).await.unwrap_err());

    assert_eq!(vec![tweet2], tx.get_tweets().await.unwrap());
}

pub(crate) async fn test_ids_are_not_reused<D>(db: D)
where
    D: Db,
    D::Tx: TweetsTx,
{
    let now = datetime!(2023-06-11 20:15:00 UTC);

    let mut tx = db.begin().await.unwrap();
    let tweet1 = tx.create_tweet(&message("first"), now).await.unwrap();
    tx.delete_tweet(tweet1.id()).await.unwrap();
    let tweet2 = tx.create_tweet(&message("second"), now).await.unwrap();
    tx.commit().await.unwrap();

    assert!(tweet2.id().as_i32() > tweet1.id().as_i32());
}

pub(crate) async fn test_rollback_on_drop<D>(db: D)
where
    D: Db,
    D::Tx: TweetsTx,
{
    {
        let mut tx = db.begin().await.unwrap();
        tx.create_tweet(&message("lost"), datetime!(2023-06-11 20:15:00 UTC)).await.unwrap();
    }

    let mut tx = db.begin().await.unwrap();
    assert_eq!(Vec::<Tweet>::new(), tx.get_tweets().await.unwrap());
}

macro_rules! generate_db_tests [
    ( $setup:expr $(, #[$extra:meta])? ) => {
        tweets_core::db::testutils::generate_tests!(
            $( #[$extra], )?
            $setup,
            $crate::db::tests,
            test_create_and_get,
            test_create_assigns_distinct_ids,
            test_get_tweets,
            test_get_tweet_not_found,
            test_update_tweet,
            test_update_tweet_not_found,
            test_delete_tweet,
            test_ids_are_not_reused,
            test_rollback_on_drop
        );
    }
];

pub(crate) use generate_db_tests;
