use diesel::prelude::*;
use uuid::Uuid;

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::likes)]
pub struct NewLike {
    pub post_id: Uuid,
    pub user_id: Uuid,
}
