//! Form schemas and validation for posts, comments and accounts.
//!
//! Each form has a raw input struct (what the client submitted, every field
//! defaulted so a missing field becomes an empty one) and a `clean` method
//! that either yields the validated values or a [`FormErrors`] map of
//! per-field messages. Nothing here touches storage: checks that need the
//! database (group existence, username uniqueness, current password) are
//! added by the caller through [`FormErrors::add`].
//!
//! Messages are the site's user-facing (Russian) texts.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Cursor;
use std::sync::LazyLock;

use image::{ImageFormat, ImageReader};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationErrors};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

pub const REQUIRED_MESSAGE: &str = "Обязательное поле.";

pub const INVALID_CHOICE_MESSAGE: &str =
    "Выберите корректный вариант. Вашего варианта нет среди допустимых значений.";

/// Error shown for any upload that does not decode as an image.
pub const IMAGE_INVALID_MESSAGE: &str = "Загрузите правильное изображение. \
     Файл, который вы загрузили, поврежден или не является изображением.";

pub const USERNAME_INVALID_MESSAGE: &str = "Введите правильное имя пользователя. \
     Оно может содержать только буквы, цифры и знаки @/./+/-/_.";

pub const USERNAME_TAKEN_MESSAGE: &str = "Пользователь с таким именем уже существует.";

pub const PASSWORD_MISMATCH_MESSAGE: &str = "Введенные пароли не совпадают.";

pub const PASSWORD_TOO_SHORT_MESSAGE: &str =
    "Введённый пароль слишком короткий. Он должен содержать как минимум 8 символов.";

pub const PASSWORD_INCORRECT_MESSAGE: &str =
    "Ваш старый пароль введен неправильно. Пожалуйста, введите его снова.";

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+\z").expect("username pattern is valid"));

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an error map holding a single message.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn merge(&mut self, other: FormErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Fold a `validator` report into this map.
    fn merge_report(&mut self, report: &ValidationErrors) {
        for (field, errors) in report.field_errors() {
            for err in errors.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                self.add(&field.to_string(), message);
            }
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Field metadata
// ---------------------------------------------------------------------------

/// Input widget family of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Choice,
    Image,
    Email,
    Password,
}

/// Static description of one form field (label, help text, requiredness).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub help_text: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

pub const POST_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "text",
        label: "Текст",
        help_text: "Добавьте текст для новой записи",
        required: true,
        kind: FieldKind::Text,
    },
    FieldSpec {
        name: "group",
        label: "Группа",
        help_text: "Выберите группу для новой записи",
        required: false,
        kind: FieldKind::Choice,
    },
    FieldSpec {
        name: "image",
        label: "Картинка",
        help_text: "",
        required: false,
        kind: FieldKind::Image,
    },
];

pub const COMMENT_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "text",
    label: "Текст",
    help_text: "Прокомментировать",
    required: true,
    kind: FieldKind::Text,
}];

pub const SIGNUP_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "first_name",
        label: "Имя",
        help_text: "",
        required: false,
        kind: FieldKind::Text,
    },
    FieldSpec {
        name: "last_name",
        label: "Фамилия",
        help_text: "",
        required: false,
        kind: FieldKind::Text,
    },
    FieldSpec {
        name: "username",
        label: "Имя пользователя",
        help_text: "Не более 150 символов. Только буквы, цифры и символы @/./+/-/_.",
        required: true,
        kind: FieldKind::Text,
    },
    FieldSpec {
        name: "email",
        label: "Адрес электронной почты",
        help_text: "",
        required: false,
        kind: FieldKind::Email,
    },
    FieldSpec {
        name: "password1",
        label: "Пароль",
        help_text: "Пароль должен содержать как минимум 8 символов.",
        required: true,
        kind: FieldKind::Password,
    },
    FieldSpec {
        name: "password2",
        label: "Подтверждение пароля",
        help_text: "Для подтверждения введите, пожалуйста, пароль ещё раз.",
        required: true,
        kind: FieldKind::Password,
    },
];

pub const LOGIN_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "username",
        label: "Имя пользователя",
        help_text: "",
        required: true,
        kind: FieldKind::Text,
    },
    FieldSpec {
        name: "password",
        label: "Пароль",
        help_text: "",
        required: true,
        kind: FieldKind::Password,
    },
];

pub const PASSWORD_CHANGE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "old_password",
        label: "Старый пароль",
        help_text: "",
        required: true,
        kind: FieldKind::Password,
    },
    FieldSpec {
        name: "new_password1",
        label: "Новый пароль",
        help_text: "Пароль должен содержать как минимум 8 символов.",
        required: true,
        kind: FieldKind::Password,
    },
    FieldSpec {
        name: "new_password2",
        label: "Подтверждение нового пароля",
        help_text: "",
        required: true,
        kind: FieldKind::Password,
    },
];

/// Look up a field description by name.
pub fn field_spec(fields: &'static [FieldSpec], name: &str) -> Option<&'static FieldSpec> {
    fields.iter().find(|f| f.name == name)
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// A file received in an `image` form field.
#[derive(Debug, Clone, Default)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Browsers send an empty part when no file was chosen.
    pub fn is_blank(&self) -> bool {
        self.file_name.is_empty() && self.bytes.is_empty()
    }
}

/// An upload that decoded successfully.
#[derive(Debug, Clone)]
pub struct CleanImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl CleanImage {
    /// Canonical file extension for the detected format.
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("img")
    }
}

/// Accept the upload only if its content decodes as a supported image.
///
/// The file name and declared content type are ignored; only the bytes count.
pub fn validate_image(upload: ImageUpload) -> Result<CleanImage, String> {
    match decode_format(&upload.bytes) {
        Some(format) => Ok(CleanImage {
            bytes: upload.bytes,
            format,
        }),
        None => Err(IMAGE_INVALID_MESSAGE.to_string()),
    }
}

fn decode_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.is_empty() {
        return None;
    }
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    let format = reader.format()?;
    reader.decode().ok()?;
    Some(format)
}

// ---------------------------------------------------------------------------
// Post form
// ---------------------------------------------------------------------------

/// Raw post form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostSubmission {
    #[serde(default)]
    pub text: String,
    /// Group id as submitted; empty means "no group".
    #[serde(default)]
    pub group: String,
    #[serde(skip)]
    pub image: Option<ImageUpload>,
}

/// A validated post form.
///
/// `group_id` has been parsed but not yet checked against the database.
#[derive(Debug, Clone)]
pub struct CleanPost {
    pub text: String,
    pub group_id: Option<DbId>,
    pub image: Option<CleanImage>,
}

impl PostSubmission {
    pub fn clean(self) -> Result<CleanPost, FormErrors> {
        let mut errors = FormErrors::new();

        let text = self.text.trim().to_string();
        if text.is_empty() {
            errors.add("text", REQUIRED_MESSAGE);
        }

        let group = self.group.trim();
        let group_id = if group.is_empty() {
            None
        } else {
            match group.parse::<DbId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("group", INVALID_CHOICE_MESSAGE);
                    None
                }
            }
        };

        let image = match self.image.filter(|upload| !upload.is_blank()) {
            Some(upload) => match validate_image(upload) {
                Ok(image) => Some(image),
                Err(message) => {
                    errors.add("image", message);
                    None
                }
            },
            None => None,
        };

        if errors.is_empty() {
            Ok(CleanPost {
                text,
                group_id,
                image,
            })
        } else {
            Err(errors)
        }
    }
}

// ---------------------------------------------------------------------------
// Comment form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentSubmission {
    #[serde(default)]
    pub text: String,
}

impl CommentSubmission {
    /// Returns the trimmed comment text.
    pub fn clean(self) -> Result<String, FormErrors> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(FormErrors::single("text", REQUIRED_MESSAGE));
        }
        Ok(text.to_string())
    }
}

// ---------------------------------------------------------------------------
// Account forms
// ---------------------------------------------------------------------------

/// Registration form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignupForm {
    #[serde(default)]
    #[validate(length(
        max = 150,
        message = "Убедитесь, что это значение содержит не более 150 символов."
    ))]
    pub username: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(email(message = "Введите правильный адрес электронной почты."))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(
        max = 150,
        message = "Убедитесь, что это значение содержит не более 150 символов."
    ))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(
        max = 150,
        message = "Убедитесь, что это значение содержит не более 150 символов."
    ))]
    pub last_name: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// A validated registration; uniqueness of `username` is still unchecked.
#[derive(Debug, Clone)]
pub struct CleanSignup {
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl SignupForm {
    pub fn clean(self) -> Result<CleanSignup, FormErrors> {
        let mut errors = FormErrors::new();
        if let Err(report) = self.validate() {
            errors.merge_report(&report);
        }

        let username = self.username.trim().to_string();
        if username.is_empty() {
            errors.add("username", REQUIRED_MESSAGE);
        } else if !USERNAME_RE.is_match(&username) {
            errors.add("username", USERNAME_INVALID_MESSAGE);
        }

        if let Some(password) = check_new_password(
            &mut errors,
            ("password1", &self.password1),
            ("password2", &self.password2),
        ) {
            if errors.is_empty() {
                return Ok(CleanSignup {
                    username,
                    email: self.email,
                    first_name: self.first_name.trim().to_string(),
                    last_name: self.last_name.trim().to_string(),
                    password,
                });
            }
        }
        Err(errors)
    }
}

/// Password change for a signed-in user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordChangeForm {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password1: String,
    #[serde(default)]
    pub new_password2: String,
}

/// A validated password change; `old_password` still has to be verified.
#[derive(Debug, Clone)]
pub struct CleanPasswordChange {
    pub old_password: String,
    pub new_password: String,
}

impl PasswordChangeForm {
    pub fn clean(self) -> Result<CleanPasswordChange, FormErrors> {
        let mut errors = FormErrors::new();
        if self.old_password.is_empty() {
            errors.add("old_password", REQUIRED_MESSAGE);
        }
        let new_password = check_new_password(
            &mut errors,
            ("new_password1", &self.new_password1),
            ("new_password2", &self.new_password2),
        );
        match new_password {
            Some(new_password) if errors.is_empty() => Ok(CleanPasswordChange {
                old_password: self.old_password,
                new_password,
            }),
            _ => Err(errors),
        }
    }
}

/// Shared rules for a password typed twice. Errors land on the second field.
fn check_new_password(
    errors: &mut FormErrors,
    (first_name, first): (&str, &str),
    (second_name, second): (&str, &str),
) -> Option<String> {
    let mut ok = true;
    if first.is_empty() {
        errors.add(first_name, REQUIRED_MESSAGE);
        ok = false;
    }
    if second.is_empty() {
        errors.add(second_name, REQUIRED_MESSAGE);
        ok = false;
    }
    if !ok {
        return None;
    }
    if first != second {
        errors.add(second_name, PASSWORD_MISMATCH_MESSAGE);
        return None;
    }
    if first.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(second_name, PASSWORD_TOO_SHORT_MESSAGE);
        return None;
    }
    Some(first.to_string())
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}
