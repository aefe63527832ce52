//! `data-testid` selectors of the NutriApp frontend.

macro_rules! test_id {
    ($($name:ident => $id:literal),* $(,)?) => {
        $(pub const $name: &str = concat!("[data-testid=\"", $id, "\"]");)*
    };
}

test_id! {
    LOGIN_CONTAINER => "login-container",
    LOGIN_FORM => "login-form",
    LOGIN_TITLE => "login-title",
    LOGIN_SUBTITLE => "login-subtitle",
    LOGIN_EMAIL => "login-email-input",
    LOGIN_PASSWORD => "login-password-input",
    LOGIN_SUBMIT => "login-submit",
    LOGIN_ERROR => "login-error",
    LOGIN_REGISTER_LINK => "login-register-link",

    REGISTER_CONTAINER => "register-container",
    REGISTER_TITLE => "register-title",
    REGISTER_SUBTITLE => "register-subtitle",
    REGISTER_FIRST_NAME => "register-firstname",
    REGISTER_LAST_NAME => "register-lastname",
    REGISTER_EMAIL => "register-email",
    REGISTER_NATIONALITY => "register-nationality",
    REGISTER_PHONE => "register-phone",
    REGISTER_PASSWORD => "register-password",
    REGISTER_SUBMIT => "register-submit",
    REGISTER_LOGIN_LINK => "register-login-link",

    HOME_CONTAINER => "home-container",
    HOME_TITLE => "home-title",
    HOME_SUBTITLE => "home-subtitle",
    HOME_CTA => "home-cta",

    NAV_LOGOUT => "nav-logout-button",

    DISHES_CONTAINER => "dishes-container",
    DISHES_HEADER => "dishes-header",
    DISHES_TITLE => "dishes-title",
    DISHES_ADD_BUTTON => "dishes-add-button",
    DISH_CARD => "dish-card",
    DISH_VIEW_LINK => "dish-view-link",
    DISH_EDIT_LINK => "dish-edit-link",
    DISH_DELETE_BUTTON => "dish-delete-button",

    VIEW_DISH_CONTAINER => "view-dish-container",
    VIEW_DISH_NAME => "view-dish-name",
    VIEW_DISH_DESCRIPTION => "view-dish-description",
    VIEW_DISH_STEPS => "view-dish-steps-section",
    VIEW_DISH_STEP_TEXT => "view-dish-step-text",

    EDIT_DISH_CONTAINER => "edit-dish-container",
    EDIT_DISH_FORM => "edit-dish-form",
    EDIT_DISH_NAME => "edit-dish-name",
    EDIT_DISH_DESCRIPTION => "edit-dish-description",

    NEW_DISH_CONTAINER => "new-dish-container",
    NEW_DISH_TITLE => "new-dish-title",
    NEW_DISH_NAME => "new-dish-name-input",
    NEW_DISH_DESCRIPTION => "new-dish-description-input",
    NEW_DISH_QUICK_PREP => "new-dish-quickprep-checkbox",
    NEW_DISH_PREP_TIME => "new-dish-preptime-input",
    NEW_DISH_COOK_TIME => "new-dish-cooktime-input",
    NEW_DISH_CALORIES => "new-dish-calories-input",
    NEW_DISH_IMAGE_URL => "new-dish-image-url-input",
    NEW_DISH_STEP => "new-dish-step-input",
    NEW_DISH_ADD_STEP => "new-dish-add-step-button",
    NEW_DISH_SUBMIT => "new-dish-submit-button",
}
