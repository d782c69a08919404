mod guild;
pub use guild::Guild;

mod member;
pub use member::Member;
