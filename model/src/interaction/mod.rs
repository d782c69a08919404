mod application_command;
pub use application_command::{ApplicationCommand, CommandDefinition};

mod application_command_type;
pub use application_command_type::ApplicationCommandType;

mod application_command_option;
pub use application_command_option::{ApplicationCommandOption, ApplicationCommandOptionType};

mod application_command_option_choice;
pub use application_command_option_choice::{ApplicationCommandOptionChoice, ChoiceValue};

mod interaction;
pub use interaction::InteractionType;

mod application_command_interaction_data_option;
pub use application_command_interaction_data_option::{
    ApplicationCommandInteractionDataOption, OptionValue,
};

mod interaction_response;
pub use interaction_response::InteractionResponseType;
