use crate::api_client::{ApiClient, ApiError};
use crate::session_user::SessionUser;

/// Dishes whose name contains this marker were created by the suites.
pub const TEST_DATA_MARKER: &str = "Test";

/// Delete every dish of the session user that looks like test data.
///
/// The session user itself is kept. A failed login is logged and skipped,
/// it never fails the run. Returns how many dishes were deleted.
#[tracing::instrument(name = "Cleaning up test data", skip_all)]
pub async fn cleanup_test_data(
    api: &ApiClient,
    session_user: &SessionUser,
) -> Result<usize, ApiError> {
    let login = api.login(&session_user.identity().credentials()).await?;
    let session = match (login.status_code(), login.session) {
        (200, Some(session)) => session,
        (status, _) => {
            tracing::warn!(status, "Could not log in the session user for cleanup, skipping");
            return Ok(0);
        }
    };

    let listing = api.list_dishes(Some(&session)).await?;
    if listing.status_code() != 200 {
        tracing::warn!(status = listing.status_code(), "Could not list dishes for cleanup");
        return Ok(0);
    }
    if let Some(error) = &listing.parse_error {
        tracing::warn!(%error, "Dish listing could not be read, skipping cleanup");
        return Ok(0);
    }

    let mut deleted = 0;
    for dish in listing
        .dishes
        .iter()
        .filter(|dish| dish.name.contains(TEST_DATA_MARKER))
    {
        let response = api.delete_dish(dish.id, Some(&session)).await?;
        if response.status.is_success() {
            deleted += 1;
        } else {
            tracing::warn!(
                dish_id = dish.id,
                status = response.status_code(),
                "Dish was not deleted"
            );
        }
    }
    tracing::info!(deleted, "Test data cleaned up");
    Ok(deleted)
}
