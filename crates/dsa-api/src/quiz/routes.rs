use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use dsa_core::{
    cooldown_status, grade_attempt, next_attempt_number, pass_threshold,
    scoring::{topic_breakdown, weak_topics},
    unlock::{card_progress, card_progress_impact},
};
use dsa_db::{
    models::{QuizBankEntry, QuizResultInsert, QuizResultSummary},
    repositories::{progress, quiz, roadmap},
};
use sqlx::{Executor, Postgres};
use uuid::Uuid;
use validator::Validate;

use super::{
    model::{AttemptDetail, AttemptsQuery, QuizQuery, QuizResponse, SubmitQuizRequest, SubmitQuizResponse},
    service::{canonical_keys, sample_questions},
};
use crate::{
    ApiState,
    auth::AuthUser,
    error::ApiError,
    make_rate_limit_layer, metrics,
    middleware::rate_limit,
    progress::service::progress_for_slugs,
    roadmap::routes::find_published,
};

pub fn routes() -> Router<ApiState> {
    let submit = Router::new()
        .route("/roadmaps/quiz", post(submit_quiz))
        .layer(make_rate_limit_layer!(
            rate_limit::QUIZ_SUBMIT_PERIOD_MS,
            rate_limit::QUIZ_SUBMIT_BURST_SIZE
        ));

    Router::new()
        .route("/roadmaps/quiz", get(get_quiz))
        .route("/roadmaps/quiz/attempts", get(list_attempts))
        .route(
            "/roadmaps/quiz/attempts/{attempt_id}",
            get(get_attempt).delete(delete_attempt),
        )
        .merge(submit)
}

async fn find_bank<'e, E>(executor: E, roadmap_slug: &str, quiz_id: &str) -> Result<QuizBankEntry, ApiError>
where
    E: Executor<'e, Database = Postgres>,
{
    quiz::find_bank(executor, roadmap_slug, quiz_id)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound(format!("Quiz '{quiz_id}' not found")))
}

async fn get_quiz(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<QuizQuery>,
) -> Result<Json<QuizResponse>, ApiError> {
    let roadmap = find_published(&state.pool, &query.roadmap_id).await?;
    let bank = find_bank(&state.pool, &roadmap.slug, &query.quiz_id).await?;

    let last = quiz::last_attempt(&state.pool, auth_user.user_id, &roadmap.slug, &bank.quiz_id)
        .await
        .map_err(ApiError::Database)?;

    let count = query.count.unwrap_or(state.quiz_sample_size).max(1);
    let questions = sample_questions(&bank.questions, count);

    Ok(Json(QuizResponse {
        roadmap_id: roadmap.slug,
        quiz_id: bank.quiz_id,
        quiz_name: bank.quiz_name,
        is_card_test: bank.is_card_test,
        time_limit_seconds: bank.time_limit_seconds,
        passing_score: pass_threshold(bank.is_card_test, Some(roadmap.passing_score)),
        total_available: bank.questions.len(),
        questions,
        cooldown: cooldown_status(last.last_completed_at, Utc::now()),
        next_attempt_number: next_attempt_number(last.max_attempt_number),
    }))
}

/// Grade and store an attempt.
///
/// Cooldown check, result insert and any card-test unlock share one
/// transaction, serialized per (user, roadmap, quiz).
async fn submit_quiz(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(payload): Json<SubmitQuizRequest>,
) -> Result<(StatusCode, Json<SubmitQuizResponse>), ApiError> {
    payload.validate()?;

    let mut tx = state.pool.begin().await.map_err(ApiError::Database)?;

    auth_user.record_seen(&mut *tx).await?;

    let roadmap = find_published(&mut *tx, &payload.roadmap_id).await?;
    let bank = find_bank(&mut *tx, &roadmap.slug, &payload.quiz_id).await?;

    quiz::lock_attempts(&mut *tx, auth_user.user_id, &roadmap.slug, &bank.quiz_id)
        .await
        .map_err(ApiError::Database)?;

    let last = quiz::last_attempt(&mut *tx, auth_user.user_id, &roadmap.slug, &bank.quiz_id)
        .await
        .map_err(ApiError::Database)?;

    let cooldown = cooldown_status(last.last_completed_at, Utc::now());
    if cooldown.active {
        metrics::record_quiz_cooldown_rejection();
        return Err(ApiError::Cooldown {
            available_at: cooldown.available_at.unwrap_or_else(Utc::now),
            remaining_seconds: cooldown.remaining_seconds,
        });
    }

    let keys = canonical_keys(&bank.questions, payload.question_ids.as_deref())?;
    let is_card_test = bank.is_card_test;
    if payload.is_card_test.is_some_and(|flag| flag != is_card_test) {
        tracing::debug!(quiz = %bank.quiz_id, "client card test flag disagrees with quiz bank");
    }

    let threshold = pass_threshold(is_card_test, Some(roadmap.passing_score));
    let graded = grade_attempt(&keys, &payload.answers, threshold);

    let mut roadmap_unlocked = false;
    let card_impact = if is_card_test {
        let existing = progress::find(&mut *tx, auth_user.user_id, &roadmap.slug)
            .await
            .map_err(ApiError::Database)?;
        let before = if existing.as_ref().is_some_and(|p| p.unlocked_via_card_test) {
            100
        } else {
            let percentages = progress_for_slugs(&mut *tx, auth_user.user_id, &roadmap.prerequisites)
                .await
                .map_err(ApiError::Database)?;
            card_progress(&percentages)
        };

        if graded.passed {
            let created = progress::mark_unlocked_via_card_test(&mut *tx, auth_user.user_id, &roadmap.slug)
                .await
                .map_err(ApiError::Database)?;
            if created {
                roadmap::increment_followers(&mut *tx, &roadmap.slug)
                    .await
                    .map_err(ApiError::Database)?;
            }
            roadmap_unlocked = existing.is_none_or(|p| !p.unlocked_via_card_test);
        }

        Some(card_progress_impact(before, graded.passed))
    } else {
        None
    };

    let result = quiz::insert_result(
        &mut *tx,
        &QuizResultInsert {
            user_id: auth_user.user_id,
            roadmap_slug: roadmap.slug.clone(),
            quiz_id: bank.quiz_id.clone(),
            attempt_number: next_attempt_number(last.max_attempt_number),
            score: graded.score,
            total_questions: graded.total_questions,
            percentage: graded.percentage,
            passed: graded.passed,
            time_taken: payload.time_taken,
            answers: graded.answers,
            is_card_test,
            card_progress_impact: card_impact,
        },
    )
    .await
    .map_err(|e| ApiError::from_write(e, "Attempt was already recorded"))?;

    tx.commit().await.map_err(ApiError::Database)?;

    metrics::record_quiz_attempt(is_card_test, result.passed);
    if roadmap_unlocked {
        metrics::record_card_test_unlock();
    }
    tracing::info!(
        user_id = %auth_user.user_id,
        roadmap = %roadmap.slug,
        quiz = %result.quiz_id,
        attempt = result.attempt_number,
        percentage = result.percentage,
        passed = result.passed,
        "quiz attempt graded"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitQuizResponse {
            passing_score: threshold,
            breakdown: topic_breakdown(&result.answers),
            weak_topics: weak_topics(&result.answers),
            cooldown: cooldown_status(Some(result.completed_at), Utc::now()),
            roadmap_unlocked,
            result,
        }),
    ))
}

async fn list_attempts(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<AttemptsQuery>,
) -> Result<Json<Vec<QuizResultSummary>>, ApiError> {
    let attempts = quiz::list_results(&state.pool, auth_user.user_id, query.roadmap_id.as_deref())
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(attempts))
}

async fn get_attempt(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(attempt_id): Path<Uuid>,
) -> Result<Json<AttemptDetail>, ApiError> {
    let result = quiz::find_result(&state.pool, attempt_id, auth_user.user_id)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound("Attempt not found".to_string()))?;

    Ok(Json(AttemptDetail {
        breakdown: topic_breakdown(&result.answers),
        weak_topics: weak_topics(&result.answers),
        result,
    }))
}

/// Delete one of the caller's own attempts. Other users' attempts read as missing.
async fn delete_attempt(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(attempt_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = quiz::delete_result(&state.pool, attempt_id, auth_user.user_id)
        .await
        .map_err(ApiError::Database)?;

    if !deleted {
        return Err(ApiError::NotFound("Attempt not found".to_string()));
    }

    tracing::info!(user_id = %auth_user.user_id, %attempt_id, "quiz attempt deleted");
    Ok(StatusCode::NO_CONTENT)
}
