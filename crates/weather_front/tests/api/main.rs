mod home_page;
