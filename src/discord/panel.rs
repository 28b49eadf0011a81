/// 경매 생성 패널
/// 1. setup 명령으로 게시되는 "Create Auction" 버튼
/// 2. 버튼을 누르면 열리는 제목/설명 입력 양식
// region:    --- Imports
use crate::commands::{TICKET_DESCRIPTION_MAX, TICKET_TITLE_MAX};
use serenity::all::{
    ButtonStyle, CreateActionRow, CreateButton, CreateEmbed, CreateInputText, CreateMessage,
    CreateModal, InputTextStyle,
};

// endregion: --- Imports

pub const CREATE_BUTTON_ID: &str = "create_auction";
pub const TICKET_MODAL_ID: &str = "auction_modal";
pub const TITLE_FIELD_ID: &str = "title";
pub const DESCRIPTION_FIELD_ID: &str = "description";

const COLOR_PANEL: u32 = 0xBB86FC;

/// 버튼이 달린 안내 메시지
pub fn setup_panel() -> CreateMessage {
    let embed = CreateEmbed::new()
        .title("Auction System")
        .description("Click the button below to create a new auction")
        .colour(COLOR_PANEL);
    let button = CreateButton::new(CREATE_BUTTON_ID)
        .label("Create Auction")
        .style(ButtonStyle::Primary);
    CreateMessage::new()
        .embed(embed)
        .components(vec![CreateActionRow::Buttons(vec![button])])
}

/// 경매 생성 양식
pub fn ticket_modal() -> CreateModal {
    let title = CreateInputText::new(InputTextStyle::Short, "Item Title", TITLE_FIELD_ID)
        .placeholder("What are you auctioning?")
        .max_length(TICKET_TITLE_MAX as u16)
        .required(true);
    let description = CreateInputText::new(
        InputTextStyle::Paragraph,
        "Description",
        DESCRIPTION_FIELD_ID,
    )
    .placeholder("Condition, details, what you expect in return")
    .max_length(TICKET_DESCRIPTION_MAX as u16)
    .required(false);

    CreateModal::new(TICKET_MODAL_ID, "Create Auction").components(vec![
        CreateActionRow::InputText(title),
        CreateActionRow::InputText(description),
    ])
}

/// 제출된 입력 칸에서 (제목, 설명) 추출, 없는 칸은 빈 문자열
pub fn ticket_form_values<'a>(
    fields: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
) -> (String, String) {
    let mut title = String::new();
    let mut description = String::new();
    for (custom_id, value) in fields {
        let value = value.unwrap_or_default().to_string();
        match custom_id {
            TITLE_FIELD_ID => title = value,
            DESCRIPTION_FIELD_ID => description = value,
            _ => {}
        }
    }
    (title, description)
}
