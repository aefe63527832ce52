//! Multi-step journeys through the NutriApp frontend.
use super::selectors as sel;
use super::session::{UiError, UiSession, xpath_literal};
use crate::authentication::{AuthError, AuthPath, Authenticated, UiLogin};
use crate::context::TestContext;
use crate::domain::{DishFixture, SessionCredential, TestIdentity};
use crate::session_user::ProvisioningError;
use secrecy::{ExposeSecret, Secret};
use thirtyfour::prelude::*;

const LAST_STEP_INPUT: &str = "(//*[@data-testid=\"new-dish-step-input\"])[last()]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DishCardAction {
    View,
    Edit,
    Delete,
}

impl DishCardAction {
    fn selector(self) -> &'static str {
        match self {
            DishCardAction::View => sel::DISH_VIEW_LINK,
            DishCardAction::Edit => sel::DISH_EDIT_LINK,
            DishCardAction::Delete => sel::DISH_DELETE_BUTTON,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SessionLoginError {
    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Ui(#[from] UiError),
}

impl UiSession {
    /// Create a dish through `/dishes/new` and wait until it shows up in the list.
    #[tracing::instrument(
        name = "Creating dish through the form",
        skip_all,
        fields(name = %dish.name)
    )]
    pub async fn fill_and_submit_dish_form(&self, dish: &DishFixture) -> Result<(), UiError> {
        self.visit("/dishes/new").await?;
        self.type_into(sel::NEW_DISH_NAME, &dish.name).await?;
        self.type_into(sel::NEW_DISH_DESCRIPTION, &dish.description)
            .await?;

        if dish.quick_prep {
            self.set_checked(sel::NEW_DISH_QUICK_PREP, true).await?;
        } else {
            if let Some(prep_time) = dish.prep_time {
                self.clear_and_type(sel::NEW_DISH_PREP_TIME, &prep_time.to_string())
                    .await?;
            }
            if let Some(cook_time) = dish.cook_time {
                self.clear_and_type(sel::NEW_DISH_COOK_TIME, &cook_time.to_string())
                    .await?;
            }
        }
        if let Some(calories) = dish.calories {
            self.clear_and_type(sel::NEW_DISH_CALORIES, &calories.to_string())
                .await?;
        }
        if let Some(image_url) = &dish.image_url {
            self.type_into(sel::NEW_DISH_IMAGE_URL, image_url).await?;
        }

        let mut steps = dish.steps.iter();
        if let Some(first) = steps.next() {
            self.type_into(sel::NEW_DISH_STEP, first).await?;
        }
        for step in steps {
            self.click(sel::NEW_DISH_ADD_STEP).await?;
            self.wait_for_xpath(LAST_STEP_INPUT)
                .await?
                .send_keys(step)
                .await?;
        }

        self.click(sel::NEW_DISH_SUBMIT).await?;
        self.wait_for_url("/dishes").await?;
        self.wait_for_text(&dish.name).await?;
        Ok(())
    }

    /// Fill and submit the login form without waiting for the outcome.
    pub async fn submit_login_form(&self, email: &str, password: &str) -> Result<(), UiError> {
        self.visit("/login").await?;
        self.type_into(sel::LOGIN_EMAIL, email).await?;
        self.type_into(sel::LOGIN_PASSWORD, password).await?;
        self.click(sel::LOGIN_SUBMIT).await
    }

    #[tracing::instrument(
        name = "Registering through the form",
        skip_all,
        fields(email = %identity.email)
    )]
    pub async fn register_via_form(&self, identity: &TestIdentity) -> Result<(), UiError> {
        self.visit("/register").await?;
        self.type_into(sel::REGISTER_FIRST_NAME, &identity.first_name)
            .await?;
        self.type_into(sel::REGISTER_LAST_NAME, &identity.last_name)
            .await?;
        self.type_into(sel::REGISTER_EMAIL, &identity.email).await?;
        self.type_into(sel::REGISTER_NATIONALITY, &identity.nationality)
            .await?;
        self.type_into(sel::REGISTER_PHONE, &identity.phone).await?;
        self.type_into(sel::REGISTER_PASSWORD, identity.password.expose_secret())
            .await?;
        self.click(sel::REGISTER_SUBMIT).await?;
        self.wait_for_url("/login").await?;
        Ok(())
    }

    pub async fn go_to_dishes(&self) -> Result<(), UiError> {
        self.visit("/dishes").await?;
        self.find(sel::DISHES_CONTAINER).await?;
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), UiError> {
        self.click(sel::NAV_LOGOUT).await?;
        self.wait_for_url("/login").await?;
        Ok(())
    }

    /// Click the view, edit or delete control of the card showing `dish_name`.
    pub async fn open_dish_card_action(
        &self,
        dish_name: &str,
        action: DishCardAction,
    ) -> Result<(), UiError> {
        let card = self.dish_card(dish_name).await?;
        card.find(By::Css(action.selector())).await?.click().await?;
        Ok(())
    }

    async fn dish_card(&self, dish_name: &str) -> Result<WebElement, UiError> {
        let xpath = format!(
            "//*[@data-testid=\"dish-card\"][.//*[text()[contains(., {})]]]",
            xpath_literal(dish_name)
        );
        self.wait_for_xpath(&xpath).await
    }

    /// Authenticate the session user by the cheapest path that works and land on `/dishes`.
    #[tracing::instrument(name = "Logging in as session user", skip_all)]
    pub async fn login_as_session_user(
        &self,
        ctx: &TestContext,
    ) -> Result<Authenticated, SessionLoginError> {
        ctx.session_user.ensure_provisioned(&ctx.api).await?;
        let authenticated = ctx
            .authenticator()
            .authenticate(Some(self as &dyn UiLogin))
            .await?;
        if authenticated.path != AuthPath::Ui {
            self.inject_session(&authenticated.credential).await?;
        }
        self.visit("/dishes").await?;
        self.wait_for_url("/dishes").await?;
        Ok(authenticated)
    }
}

#[async_trait::async_trait]
impl UiLogin for UiSession {
    async fn login_via_form(
        &self,
        email: &str,
        password: &Secret<String>,
    ) -> Result<Option<SessionCredential>, UiError> {
        self.submit_login_form(email, password.expose_secret())
            .await?;
        self.wait_for_url("/dishes").await?;
        self.session_cookie().await
    }
}
